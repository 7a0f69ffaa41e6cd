use egui::Response;
use num::{CheckedAdd, CheckedSub};

pub fn make_scrollable<T>(
    ui: &mut egui::Ui,
    resp: Response,
    //
    val: &mut T,
    increment: T,
) where
    T: Copy + PartialOrd + CheckedAdd + CheckedSub,
{
    if resp.hovered() {
        let delta = ui.input(|i| {
            i.events.iter().find_map(|e| match e {
                egui::Event::MouseWheel {
                    unit: _,
                    delta,
                    modifiers,
                } => Some(*delta),
                _ => None,
            })
        });
        if let Some(delta) = delta {
            if delta.y > 0. {
                *val = *val + increment;
            } else {
                if let Some(x) = val.checked_sub(&increment) {
                    *val = x;
                }
            }
        }
    }
}

/// Timestamps from the last 24 hours show as time only, older ones get the
/// date as well. Unparseable strings are shown as-is.
pub fn format_timestamp(ts: &str, now: chrono::NaiveDateTime) -> String {
    let Ok(t) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") else {
        return ts.to_string();
    };

    let age = now.signed_duration_since(t);

    if age.num_hours() < 24 {
        t.format("%H:%M:%S").to_string()
    } else {
        t.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

pub fn confidence_color(confidence: f64) -> egui::Color32 {
    if confidence >= 0.7 {
        egui::Color32::from_rgb(46, 204, 113)
    } else if confidence >= 0.4 {
        egui::Color32::from_rgb(243, 156, 18)
    } else {
        egui::Color32::from_rgb(231, 76, 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> chrono::NaiveDateTime {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").unwrap()
    }

    #[test]
    fn recent_timestamp_shows_time_only() {
        let now = dt("2025-06-02T10:00:00.0");
        assert_eq!(
            format_timestamp("2025-06-02T09:15:30.123456", now),
            "09:15:30"
        );
    }

    #[test]
    fn day_old_timestamp_shows_date() {
        let now = dt("2025-06-02T10:00:00.0");
        assert_eq!(
            format_timestamp("2025-05-30T09:15:30.0", now),
            "2025-05-30 09:15:30"
        );
    }

    #[test]
    fn just_under_24h_is_time_only() {
        let now = dt("2025-06-02T10:00:00.0");
        assert_eq!(format_timestamp("2025-06-01T10:30:00.0", now), "10:30:00");
    }

    #[test]
    fn garbage_timestamp_passes_through() {
        let now = dt("2025-06-02T10:00:00.0");
        assert_eq!(format_timestamp("not a date", now), "not a date");
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(confidence_color(0.95), egui::Color32::from_rgb(46, 204, 113));
        assert_eq!(confidence_color(0.7), egui::Color32::from_rgb(46, 204, 113));
        assert_eq!(confidence_color(0.5), egui::Color32::from_rgb(243, 156, 18));
        assert_eq!(confidence_color(0.4), egui::Color32::from_rgb(243, 156, 18));
        assert_eq!(confidence_color(0.1), egui::Color32::from_rgb(231, 76, 60));
    }
}
