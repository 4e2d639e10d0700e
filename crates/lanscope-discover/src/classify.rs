//! Heuristic device classification from IP address and vendor name.

use lanscope_core::DeviceCategory;

/// Vendor keywords per category, matched as lower-case substrings.
///
/// Order is the tie-break: the first category with a matching keyword wins.
/// "huawei" appears under both `Phone` and `Router` ("huawei technologies");
/// because `Phone` is listed first, every Huawei vendor string classifies as a
/// phone. Likewise "sony interactive" is shadowed by `Tv`'s "sony".
pub const VENDOR_KEYWORDS: &[(DeviceCategory, &[&str])] = &[
    (
        DeviceCategory::Phone,
        &["apple", "samsung", "xiaomi", "huawei", "oneplus", "motorola", "pixel"],
    ),
    (
        DeviceCategory::Pc,
        &[
            "dell",
            "lenovo",
            "hp",
            "hewlett packard",
            "asus",
            "acer",
            "msi",
            "intel",
            "giga-byte",
        ],
    ),
    (
        DeviceCategory::Router,
        &[
            "cisco",
            "tp-link",
            "netgear",
            "ubiquiti",
            "d-link",
            "linksys",
            "huawei technologies",
        ],
    ),
    (DeviceCategory::Printer, &["canon", "epson", "brother", "xerox"]),
    (DeviceCategory::Tv, &["lg", "sony", "roku", "tcl"]),
    (
        DeviceCategory::GameConsole,
        &["nintendo", "sony interactive", "microsoft"],
    ),
];

/// Classify a device. Pure and total.
///
/// 1. An IP ending in `.1` is taken to be the /24's gateway: `Router`.
/// 2. Otherwise the first [`VENDOR_KEYWORDS`] entry matching the vendor wins.
/// 3. Otherwise `Unknown`. A missing vendor matches nothing.
pub fn classify(_mac: &str, vendor: Option<&str>, ip: &str) -> DeviceCategory {
    if ip.ends_with(".1") {
        return DeviceCategory::Router;
    }

    let vendor = vendor.unwrap_or_default().to_lowercase();
    if vendor.is_empty() {
        return DeviceCategory::Unknown;
    }

    VENDOR_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| vendor.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(DeviceCategory::Unknown)
}
