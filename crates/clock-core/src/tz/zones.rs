/// One selectable entry in the timezone list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Zone {
    pub name: &'static str,
    pub posix: &'static str,
}

pub const TIMEZONES: [Zone; 60] = [
    Zone {
        name: "UTC (UTC+0)",
        posix: "UTC0",
    },
    Zone {
        name: "Honolulu (UTC-10)",
        posix: "HST10",
    },
    Zone {
        name: "Anchorage (UTC-9)",
        posix: "AKST9AKDT,M3.2.0,M11.1.0",
    },
    Zone {
        name: "Los Angeles (UTC-8)",
        posix: "PST8PDT,M3.2.0,M11.1.0",
    },
    Zone {
        name: "Phoenix (UTC-7)",
        posix: "MST7",
    },
    Zone {
        name: "Denver (UTC-7)",
        posix: "MST7MDT,M3.2.0,M11.1.0",
    },
    Zone {
        name: "Mexico City (UTC-6)",
        posix: "CST6CDT,M4.1.0,M10.5.0",
    },
    Zone {
        name: "Chicago (UTC-6)",
        posix: "CST6CDT,M3.2.0,M11.1.0",
    },
    Zone {
        name: "New York (UTC-5)",
        posix: "EST5EDT,M3.2.0,M11.1.0",
    },
    Zone {
        name: "Panama (UTC-5)",
        posix: "EST5",
    },
    Zone {
        name: "Bogota (UTC-5)",
        posix: "COT5",
    },
    Zone {
        name: "Lima (UTC-5)",
        posix: "PET5",
    },
    Zone {
        name: "Halifax (UTC-4)",
        posix: "AST4ADT,M3.2.0,M11.1.0",
    },
    Zone {
        name: "Santiago (UTC-4)",
        posix: "CLT4CLST,M9.1.0,M4.1.0",
    },
    Zone {
        name: "St. John's (UTC-3:30)",
        posix: "NST3:30NDT,M3.2.0,M11.1.0",
    },
    Zone {
        name: "Sao Paulo (UTC-3)",
        posix: "BRT3",
    },
    Zone {
        name: "Buenos Aires (UTC-3)",
        posix: "ART3",
    },
    Zone {
        name: "Reykjavik (UTC+0)",
        posix: "GMT0",
    },
    Zone {
        name: "London (UTC+0)",
        posix: "GMT0BST,M3.5.0/1,M10.5.0",
    },
    Zone {
        name: "Dublin (UTC+0)",
        posix: "GMT0IST,M3.5.0/1,M10.5.0",
    },
    Zone {
        name: "Lisbon (UTC+0)",
        posix: "WET0WEST,M3.5.0/1,M10.5.0",
    },
    Zone {
        name: "Casablanca (UTC+0)",
        posix: "WET0WEST,M3.5.0,M10.5.0",
    },
    Zone {
        name: "Lagos (UTC+1)",
        posix: "WAT-1",
    },
    Zone {
        name: "Paris (UTC+1)",
        posix: "CET-1CEST,M3.5.0,M10.5.0/3",
    },
    Zone {
        name: "Berlin (UTC+1)",
        posix: "CET-1CEST,M3.5.0,M10.5.0/3",
    },
    Zone {
        name: "Rome (UTC+1)",
        posix: "CET-1CEST,M3.5.0,M10.5.0/3",
    },
    Zone {
        name: "Johannesburg (UTC+2)",
        posix: "SAST-2",
    },
    Zone {
        name: "Cairo (UTC+2)",
        posix: "EET-2",
    },
    Zone {
        name: "Athens (UTC+2)",
        posix: "EET-2EEST,M3.5.0/3,M10.5.0/4",
    },
    Zone {
        name: "Jerusalem (UTC+2)",
        posix: "IST-2IDT,M3.4.4/26,M10.5.0",
    },
    Zone {
        name: "Helsinki (UTC+2)",
        posix: "EET-2EEST,M3.5.0/3,M10.5.0/4",
    },
    Zone {
        name: "Istanbul (UTC+3)",
        posix: "TRT-3",
    },
    Zone {
        name: "Moscow (UTC+3)",
        posix: "MSK-3",
    },
    Zone {
        name: "Nairobi (UTC+3)",
        posix: "EAT-3",
    },
    Zone {
        name: "Riyadh (UTC+3)",
        posix: "AST-3",
    },
    Zone {
        name: "Tehran (UTC+3:30)",
        posix: "IRST-3:30IRDT,J80/0,J264/0",
    },
    Zone {
        name: "Dubai (UTC+4)",
        posix: "GST-4",
    },
    Zone {
        name: "Karachi (UTC+5)",
        posix: "PKT-5",
    },
    Zone {
        name: "Mumbai (UTC+5:30)",
        posix: "IST-5:30",
    },
    Zone {
        name: "Kolkata (UTC+5:30)",
        posix: "IST-5:30",
    },
    Zone {
        name: "Kathmandu (UTC+5:45)",
        posix: "NPT-5:45",
    },
    Zone {
        name: "Dhaka (UTC+6)",
        posix: "BST-6",
    },
    Zone {
        name: "Bangkok (UTC+7)",
        posix: "ICT-7",
    },
    Zone {
        name: "Ho Chi Minh (UTC+7)",
        posix: "ICT-7",
    },
    Zone {
        name: "Jakarta (UTC+7)",
        posix: "WIB-7",
    },
    Zone {
        name: "Singapore (UTC+8)",
        posix: "SGT-8",
    },
    Zone {
        name: "Kuala Lumpur (UTC+8)",
        posix: "MYT-8",
    },
    Zone {
        name: "Hong Kong (UTC+8)",
        posix: "HKT-8",
    },
    Zone {
        name: "Shanghai (UTC+8)",
        posix: "CST-8",
    },
    Zone {
        name: "Taipei (UTC+8)",
        posix: "CST-8",
    },
    Zone {
        name: "Manila (UTC+8)",
        posix: "PHT-8",
    },
    Zone {
        name: "Perth (UTC+8)",
        posix: "AWST-8",
    },
    Zone {
        name: "Seoul (UTC+9)",
        posix: "KST-9",
    },
    Zone {
        name: "Tokyo (UTC+9)",
        posix: "JST-9",
    },
    Zone {
        name: "Adelaide (UTC+9:30)",
        posix: "ACST-9:30ACDT,M10.1.0,M4.1.0/3",
    },
    Zone {
        name: "Sydney (UTC+10)",
        posix: "AEST-10AEDT,M10.1.0,M4.1.0/3",
    },
    Zone {
        name: "Melbourne (UTC+10)",
        posix: "AEST-10AEDT,M10.1.0,M4.1.0/3",
    },
    Zone {
        name: "Auckland (UTC+12)",
        posix: "NZST-12NZDT,M9.5.0,M4.1.0/3",
    },
    Zone {
        name: "Fiji (UTC+12)",
        posix: "FJT-12",
    },
    Zone {
        name: "Samoa (UTC-11)",
        posix: "SST11",
    },
];

/// Position of the first entry whose rule equals `posix`.
pub fn zone_index(posix: &str) -> Option<usize> {
    TIMEZONES.iter().position(|zone| zone.posix == posix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TIMEZONE_MAX_LEN;

    #[test]
    fn rules_fit_in_settings() {
        assert!(TIMEZONES.iter().all(|zone| zone.posix.len() <= TIMEZONE_MAX_LEN));
    }

    #[test]
    fn lookup_finds_first_match() {
        assert_eq!(zone_index("UTC0"), Some(0));
        let paris = zone_index("CET-1CEST,M3.5.0,M10.5.0/3").unwrap();
        assert_eq!(TIMEZONES[paris].name, "Paris (UTC+1)");
        assert_eq!(zone_index("XYZ0"), None);
    }
}
