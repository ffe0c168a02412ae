use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Kline bucket width, spelled the way the REST API expects it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr,
)]
pub enum KlineInterval {
    #[strum(serialize = "1s")]
    OneSecond,
    #[default]
    #[strum(serialize = "1m")]
    OneMinute,
    #[strum(serialize = "3m")]
    ThreeMinutes,
    #[strum(serialize = "5m")]
    FiveMinutes,
    #[strum(serialize = "15m")]
    FifteenMinutes,
    #[strum(serialize = "30m")]
    ThirtyMinutes,
    #[strum(serialize = "1h")]
    OneHour,
    #[strum(serialize = "2h")]
    TwoHours,
    #[strum(serialize = "4h")]
    FourHours,
    #[strum(serialize = "6h")]
    SixHours,
    #[strum(serialize = "8h")]
    EightHours,
    #[strum(serialize = "12h")]
    TwelveHours,
    #[strum(serialize = "1d")]
    OneDay,
    #[strum(serialize = "3d")]
    ThreeDays,
    #[strum(serialize = "1w")]
    OneWeek,
    #[strum(serialize = "1M")]
    OneMonth,
}

impl KlineInterval {
    /// Choices offered by the chart's interval picker.
    pub const UI_CHOICES: [KlineInterval; 6] = [
        KlineInterval::OneMinute,
        KlineInterval::ThreeMinutes,
        KlineInterval::FiveMinutes,
        KlineInterval::FifteenMinutes,
        KlineInterval::ThirtyMinutes,
        KlineInterval::OneHour,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::OneSecond => "1s",
            KlineInterval::OneMinute => "1m",
            KlineInterval::ThreeMinutes => "3m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::ThirtyMinutes => "30m",
            KlineInterval::OneHour => "1h",
            KlineInterval::TwoHours => "2h",
            KlineInterval::FourHours => "4h",
            KlineInterval::SixHours => "6h",
            KlineInterval::EightHours => "8h",
            KlineInterval::TwelveHours => "12h",
            KlineInterval::OneDay => "1d",
            KlineInterval::ThreeDays => "3d",
            KlineInterval::OneWeek => "1w",
            KlineInterval::OneMonth => "1M",
        }
    }

    /// Nominal bucket length in seconds. A month counts as 30 days.
    pub fn as_secs(&self) -> u64 {
        const MIN: u64 = 60;
        const HOUR: u64 = 60 * MIN;
        const DAY: u64 = 24 * HOUR;
        match self {
            KlineInterval::OneSecond => 1,
            KlineInterval::OneMinute => MIN,
            KlineInterval::ThreeMinutes => 3 * MIN,
            KlineInterval::FiveMinutes => 5 * MIN,
            KlineInterval::FifteenMinutes => 15 * MIN,
            KlineInterval::ThirtyMinutes => 30 * MIN,
            KlineInterval::OneHour => HOUR,
            KlineInterval::TwoHours => 2 * HOUR,
            KlineInterval::FourHours => 4 * HOUR,
            KlineInterval::SixHours => 6 * HOUR,
            KlineInterval::EightHours => 8 * HOUR,
            KlineInterval::TwelveHours => 12 * HOUR,
            KlineInterval::OneDay => DAY,
            KlineInterval::ThreeDays => 3 * DAY,
            KlineInterval::OneWeek => 7 * DAY,
            KlineInterval::OneMonth => 30 * DAY,
        }
    }

    pub fn all() -> impl Iterator<Item = KlineInterval> {
        KlineInterval::iter()
    }
}
