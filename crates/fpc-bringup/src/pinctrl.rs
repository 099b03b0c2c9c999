//! Pin-control selector.
//!
//! A pin group bundles the mux settings of several pins (here, the routing
//! of the sensor's reset signal). Which pins a group touches and how is
//! defined by the platform, not here. Groups are resolved once at configure
//! time; selecting one later is a cheap lookup plus a platform call.

use fpc_core::{Error, PinStateId, PinctrlId, Result};
use fpc_hardware::Platform;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
struct ResolvedGroup {
    name: String,
    state: PinStateId,
}

/// Pin groups resolved for one device.
///
/// Empty on backends without pin control, in which case every selection
/// fails with `NotFound`.
#[derive(Debug, Default, Clone)]
pub struct PinGroups {
    pinctrl: Option<PinctrlId>,
    groups: Vec<ResolvedGroup>,
}

impl PinGroups {
    /// Acquire the pin controller and resolve every named group.
    ///
    /// Fails fast: one unresolvable group aborts the whole resolution.
    ///
    /// # Errors
    ///
    /// - `Error::Defer` if the pin-control subsystem is not ready yet.
    /// - `Error::ConfigureFailed` if the target has no pin controller or a
    ///   group cannot be found.
    pub fn resolve(platform: &dyn Platform, names: &[&str]) -> Result<Self> {
        let pinctrl = platform.pinctrl_get().map_err(|e| {
            if e.is_retryable() {
                info!("pinctrl not ready");
                Error::defer("pinctrl")
            } else {
                error!("Target does not use pinctrl: {}", e);
                Error::configure_failed(format!("target does not use pinctrl: {e}"))
            }
        })?;

        let mut groups = Vec::with_capacity(names.len());
        for &name in names {
            let state = platform.pinctrl_lookup_state(pinctrl, name).map_err(|e| {
                error!("cannot find '{}'", name);
                Error::configure_failed(format!("cannot find pin group '{name}': {e}"))
            })?;
            info!("found pin control {}", name);
            groups.push(ResolvedGroup {
                name: name.to_string(),
                state,
            });
        }

        Ok(Self {
            pinctrl: Some(pinctrl),
            groups,
        })
    }

    /// Activate the group whose name `requested` starts with.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no resolved group matches, or the
    /// platform's error if the selection is rejected.
    pub fn select(&self, platform: &dyn Platform, requested: &str) -> Result<()> {
        let found = self.pinctrl.and_then(|pinctrl| {
            self.groups
                .iter()
                .find(|group| requested.starts_with(group.name.as_str()))
                .map(|group| (pinctrl, group.state))
        });

        let Some((pinctrl, state)) = found else {
            error!("'{}' not found", requested);
            return Err(Error::pin_group_not_found(requested));
        };

        platform
            .pinctrl_select_state(pinctrl, state)
            .inspect(|_| debug!("Selected '{}'", requested))
            .inspect_err(|e| error!("cannot select '{}': {}", requested, e))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Names of the resolved groups, in resolution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpc_hardware::mock::{MockPlatform, PinctrlMode};

    const GROUPS: [&str; 2] = ["reset-reset", "reset-active"];

    #[test]
    fn test_resolve_all_groups() {
        let (platform, _handle) = MockPlatform::new();
        let pins = PinGroups::resolve(&platform, &GROUPS).unwrap();

        assert_eq!(pins.len(), 2);
        assert_eq!(pins.names().collect::<Vec<_>>(), GROUPS);
    }

    #[test]
    fn test_resolve_fails_fast_on_missing_group() {
        let (platform, _handle) = MockPlatform::builder().pin_state("reset-reset").build();

        let err = PinGroups::resolve(&platform, &GROUPS).unwrap_err();
        assert!(matches!(err, Error::ConfigureFailed { .. }));
    }

    #[test]
    fn test_resolve_defers_when_pinctrl_not_ready() {
        let (platform, _handle) = MockPlatform::builder()
            .pinctrl(PinctrlMode::NotReady)
            .build();

        let err = PinGroups::resolve(&platform, &GROUPS).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_resolve_without_pinctrl() {
        let (platform, _handle) = MockPlatform::builder().pinctrl(PinctrlMode::Absent).build();

        let err = PinGroups::resolve(&platform, &GROUPS).unwrap_err();
        assert!(matches!(err, Error::ConfigureFailed { .. }));
    }

    #[test]
    fn test_select_is_last_writer_wins() {
        let (platform, handle) = MockPlatform::new();
        let pins = PinGroups::resolve(&platform, &GROUPS).unwrap();

        pins.select(&platform, "reset-active").unwrap();
        pins.select(&platform, "reset-reset").unwrap();
        assert_eq!(handle.selected_pin_state().as_deref(), Some("reset-reset"));
    }

    #[test]
    fn test_select_prefix_match() {
        let (platform, handle) = MockPlatform::new();
        let pins = PinGroups::resolve(&platform, &GROUPS).unwrap();

        pins.select(&platform, "reset-active\n").unwrap();
        assert_eq!(handle.selected_pin_state().as_deref(), Some("reset-active"));
    }

    #[test]
    fn test_select_unknown_group() {
        let (platform, _handle) = MockPlatform::new();
        let pins = PinGroups::resolve(&platform, &GROUPS).unwrap();

        let err = pins.select(&platform, "reset-sleep").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_select_on_unresolved_groups() {
        let (platform, handle) = MockPlatform::new();
        let err = PinGroups::default().select(&platform, "reset-reset").unwrap_err();

        assert!(err.is_not_found());
        assert!(handle.selected_pin_state().is_none());
    }

    #[test]
    fn test_select_platform_failure() {
        let (platform, handle) = MockPlatform::new();
        let pins = PinGroups::resolve(&platform, &GROUPS).unwrap();
        handle.fail_pin_select("reset-active", true);

        assert!(pins.select(&platform, "reset-active").is_err());
        assert!(handle.selected_pin_state().is_none());
    }
}
