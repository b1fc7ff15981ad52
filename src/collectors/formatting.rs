//! Speed formatting for chart labels and log lines

/// Formats a speed already expressed in Mbps
///
/// ```
/// use speedtest_reporter::collectors::formatting::format_mbps;
///
/// assert_eq!(format_mbps(5.0), "5.00 Mbps");
/// assert_eq!(format_mbps(0.126), "0.13 Mbps");
/// ```
pub fn format_mbps(mbps: f64) -> String {
    format!("{mbps:.2} Mbps")
}
