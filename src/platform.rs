//! Device family detection and the "is the engine needed at all" check.

use serde::{Deserialize, Serialize};

/// Immutable device/browser profile, computed once from the user-agent
/// string and threaded explicitly into the resolver and the tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    /// Windows Phone 8.1 fakes its user agent to look like Android and
    /// iPhone, so it is detected first and masks both.
    pub windows_phone: bool,
    pub android: bool,
    pub ios: bool,
    /// iOS 4 needs exceptions for select elements and cannot use the
    /// stale-touch-identifier workaround.
    pub ios4: bool,
    /// iOS 6-7 report an invalid event target while the layer is
    /// transitioning or scrolling; the target is re-derived by hit test.
    pub ios_with_bad_target: bool,
    pub blackberry10: bool,
    /// Major Chrome version, zero for other browsers.
    pub chrome: u32,
    /// Major Firefox version, zero for other browsers.
    pub firefox: u32,
    /// BlackBerry (major, minor) browser version.
    pub blackberry: Option<(u32, u32)>,
}

impl PlatformProfile {
    pub fn from_user_agent(ua: &str) -> Self {
        let windows_phone = ua.contains("Windows Phone");
        let android = ua.contains("Android") && !windows_phone;
        let ios = (ua.contains("iPad") || ua.contains("iPhone") || ua.contains("iPod"))
            && !windows_phone;
        let ios4 = ios && ua.contains("OS 4_");
        let ios_with_bad_target = ios && (ua.contains("OS 6_") || ua.contains("OS 7_"));
        let blackberry10 = ua.contains("BB10");
        Self {
            windows_phone,
            android,
            ios,
            ios4,
            ios_with_bad_target,
            blackberry10,
            chrome: major_after(ua, "Chrome/"),
            firefox: major_after(ua, "Firefox/"),
            blackberry: if blackberry10 {
                version_pair_after(ua, "Version/")
            } else {
                None
            },
        }
    }
}

fn major_after(ua: &str, prefix: &str) -> u32 {
    let Some(rest) = ua.split(prefix).nth(1) else {
        return 0;
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn version_pair_after(ua: &str, prefix: &str) -> Option<(u32, u32)> {
    let rest = ua.split(prefix).nth(1)?;
    let mut parts = rest.split('.');
    let major: String = parts
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let minor: String = parts
        .next()
        .unwrap_or("")
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    Some((major.parse().ok()?, minor.parse().unwrap_or(0)))
}

/// Environment facts the capability check needs, gathered by the adapter
/// (or supplied directly by an embedder).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceTraits {
    /// The runtime exposes touch events at all.
    pub touch_capable: bool,
    /// A meta viewport element is present.
    pub has_meta_viewport: bool,
    /// The meta viewport declares `user-scalable=no`.
    pub viewport_user_scalable_no: bool,
    /// Document layout width fits the visual viewport
    /// (`width=device-width` or narrower).
    pub document_fits_viewport: bool,
    /// The layer style declares `touch-action: none` or `manipulation`
    /// (prefixed or not), which already disables double-tap zoom.
    pub touch_action_opt_out: bool,
}

/// Report whether tap disambiguation is needed at all. Platforms with no
/// touch capability, or browsers that already ship the equivalent
/// optimization, get a pass-through surface.
pub fn not_needed(profile: &PlatformProfile, surface: &SurfaceTraits) -> bool {
    if !surface.touch_capable {
        return true;
    }

    if profile.chrome > 0 {
        if profile.android {
            if surface.has_meta_viewport {
                // Chrome on Android with user-scalable=no has no tap delay.
                if surface.viewport_user_scalable_no {
                    return true;
                }
                // Chrome 32+ with width=device-width or less has none either.
                if profile.chrome > 31 && surface.document_fits_viewport {
                    return true;
                }
            }
        } else {
            // Desktop Chrome.
            return true;
        }
    }

    if profile.blackberry10 {
        if let Some((major, minor)) = profile.blackberry {
            // BlackBerry 10.3+ dropped the delay under the same viewport
            // conditions as Chrome.
            if major >= 10
                && minor >= 3
                && surface.has_meta_viewport
                && (surface.viewport_user_scalable_no || surface.document_fits_viewport)
            {
                return true;
            }
        }
    }

    if surface.touch_action_opt_out {
        return true;
    }

    // Firefox 27+ has no tap delay when the content is not zoomable.
    if profile.firefox >= 27
        && surface.has_meta_viewport
        && (surface.viewport_user_scalable_no || surface.document_fits_viewport)
    {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_IOS7: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 7_1 like Mac OS X) AppleWebKit/537.51.2 \
         (KHTML, like Gecko) Version/7.0 Mobile/11D201 Safari/9537.53";
    const ANDROID_CHROME: &str =
        "Mozilla/5.0 (Linux; Android 4.4.2; Nexus 5 Build/KOT49H) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/33.0.1750.136 Mobile Safari/537.36";
    const WINDOWS_PHONE: &str =
        "Mozilla/5.0 (Mobile; Windows Phone 8.1; Android 4.0; IEMobile/11.0) like iPhone \
         OS 7_0_3 Mac OS X AppleWebKit/537 (KHTML, like Gecko) Mobile Safari/537";
    const BB10: &str =
        "Mozilla/5.0 (BB10; Touch) AppleWebKit/537.35+ (KHTML, like Gecko) Version/10.3.1.2243 \
         Mobile Safari/537.35+";

    #[test]
    fn detects_ios_versions() {
        let p = PlatformProfile::from_user_agent(IPHONE_IOS7);
        assert!(p.ios);
        assert!(!p.android);
        assert!(!p.ios4);
        assert!(p.ios_with_bad_target);
    }

    #[test]
    fn detects_android_chrome_version() {
        let p = PlatformProfile::from_user_agent(ANDROID_CHROME);
        assert!(p.android);
        assert!(!p.ios);
        assert_eq!(p.chrome, 33);
    }

    #[test]
    fn windows_phone_masks_android_and_ios() {
        let p = PlatformProfile::from_user_agent(WINDOWS_PHONE);
        assert!(p.windows_phone);
        assert!(!p.android);
        assert!(!p.ios);
    }

    #[test]
    fn blackberry_version_pair() {
        let p = PlatformProfile::from_user_agent(BB10);
        assert!(p.blackberry10);
        assert_eq!(p.blackberry, Some((10, 3)));
    }

    #[test]
    fn not_needed_without_touch() {
        let p = PlatformProfile::default();
        assert!(not_needed(&p, &SurfaceTraits::default()));
    }

    #[test]
    fn needed_on_plain_ios() {
        let p = PlatformProfile::from_user_agent(IPHONE_IOS7);
        let s = SurfaceTraits {
            touch_capable: true,
            ..SurfaceTraits::default()
        };
        assert!(!not_needed(&p, &s));
    }

    #[test]
    fn desktop_chrome_never_needs_it() {
        let p = PlatformProfile {
            chrome: 120,
            ..PlatformProfile::default()
        };
        let s = SurfaceTraits {
            touch_capable: true,
            ..SurfaceTraits::default()
        };
        assert!(not_needed(&p, &s));
    }

    #[test]
    fn android_chrome_32_with_device_width_viewport() {
        let p = PlatformProfile::from_user_agent(ANDROID_CHROME);
        let s = SurfaceTraits {
            touch_capable: true,
            has_meta_viewport: true,
            document_fits_viewport: true,
            ..SurfaceTraits::default()
        };
        assert!(not_needed(&p, &s));
        // Without the viewport meta the delay is still there.
        let s = SurfaceTraits {
            touch_capable: true,
            ..SurfaceTraits::default()
        };
        assert!(!not_needed(&p, &s));
    }

    #[test]
    fn touch_action_opt_out_wins() {
        let p = PlatformProfile::from_user_agent(IPHONE_IOS7);
        let s = SurfaceTraits {
            touch_capable: true,
            touch_action_opt_out: true,
            ..SurfaceTraits::default()
        };
        assert!(not_needed(&p, &s));
    }
}
