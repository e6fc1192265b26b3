//! Locale-aware text rendering.
//!
//! A fixed set of locales is supported. Each knows its currency format, its
//! short date style and the wording of product and review lines. Unknown tags
//! fall back to `en-GB`.

use crate::entities::{Product, Review};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Supported report locales.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Locale {
    /// English (United Kingdom), the fallback
    EnGb,
    /// English (United States)
    EnUs,
    /// Spanish (Spain)
    EsEs,
    /// French (France)
    FrFr,
    /// Chinese (China)
    ZhCn,
}

impl Locale {
    /// Locale used when a requested tag is not supported.
    pub const FALLBACK: Self = Self::EnGb;

    /// Every supported locale.
    pub const ALL: [Self; 5] = [Self::EnGb, Self::EnUs, Self::EsEs, Self::FrFr, Self::ZhCn];

    /// BCP 47 tag, e.g. `en-GB`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EnGb => "en-GB",
            Self::EnUs => "en-US",
            Self::EsEs => "es-ES",
            Self::FrFr => "fr-FR",
            Self::ZhCn => "zh-CN",
        }
    }

    /// Exact (case-insensitive) lookup of a supported tag.
    #[must_use]
    pub fn find(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.tag().eq_ignore_ascii_case(tag))
    }

    /// Lookup that never fails: unsupported tags yield [`Locale::FALLBACK`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        Self::find(tag).unwrap_or(Self::FALLBACK)
    }

    /// Tags of all supported locales.
    #[must_use]
    pub fn supported_tags() -> Vec<&'static str> {
        Self::ALL.into_iter().map(Self::tag).collect()
    }

    const fn separators(self) -> (&'static str, &'static str) {
        match self {
            Self::EnGb | Self::EnUs | Self::ZhCn => (",", "."),
            Self::EsEs => (".", ","),
            Self::FrFr => ("\u{202f}", ","),
        }
    }

    /// Formats an amount as currency, rounded half-up to two decimals.
    #[must_use]
    pub fn format_money(self, amount: Decimal) -> String {
        let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        rounded = rounded.abs();
        rounded.rescale(2);

        let digits = rounded.to_string();
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        let (grouping, decimal) = self.separators();
        let number = format!("{}{decimal}{fraction}", group_digits(whole, grouping));

        match self {
            Self::EnGb => format!("{sign}£{number}"),
            Self::EnUs => format!("{sign}${number}"),
            Self::ZhCn => format!("{sign}¥{number}"),
            Self::EsEs | Self::FrFr => format!("{sign}{number}\u{a0}€"),
        }
    }

    /// Formats a date in the locale's short style.
    #[must_use]
    pub fn format_date(self, date: NaiveDate) -> String {
        let pattern = match self {
            Self::EnGb | Self::FrFr => "%d/%m/%Y",
            Self::EnUs => "%-m/%-d/%y",
            Self::EsEs => "%-d/%-m/%y",
            Self::ZhCn => "%Y/%-m/%-d",
        };
        date.format(pattern).to_string()
    }

    /// One-line product summary.
    ///
    /// Non-perishable products have no best-before date; `today` is shown in its place.
    #[must_use]
    pub fn format_product(self, product: &Product, today: NaiveDate) -> String {
        let name = product.name();
        let price = self.format_money(product.price());
        let stars = product.rating().stars();
        let date = self.format_date(product.best_before().unwrap_or(today));

        match self {
            Self::EnGb | Self::EnUs => {
                format!("{name}, price: {price}, rating: {stars}, best before: {date}")
            }
            Self::EsEs => {
                format!("{name}, precio: {price}, valoración: {stars}, consumir antes de: {date}")
            }
            Self::FrFr => {
                format!("{name}, prix : {price}, note : {stars}, à consommer avant : {date}")
            }
            Self::ZhCn => format!("{name}，价格：{price}，评分：{stars}，最佳食用期：{date}"),
        }
    }

    /// One-line review summary.
    #[must_use]
    pub fn format_review(self, review: &Review) -> String {
        let stars = review.rating().stars();
        let comments = review.comments();
        match self {
            Self::EnGb | Self::EnUs => format!("Review: {stars}\t{comments}"),
            Self::EsEs => format!("Reseña: {stars}\t{comments}"),
            Self::FrFr => format!("Avis : {stars}\t{comments}"),
            Self::ZhCn => format!("评论：{stars}\t{comments}"),
        }
    }

    /// Placeholder shown for a product without reviews.
    #[must_use]
    pub const fn no_reviews(self) -> &'static str {
        match self {
            Self::EnGb | Self::EnUs => "Not reviewed",
            Self::EsEs => "Sin reseñas",
            Self::FrFr => "Aucun avis",
            Self::ZhCn => "暂无评论",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn group_digits(whole: &str, separator: &str) -> String {
    let len = whole.len();
    let mut grouped = String::with_capacity(len + len / 3 * separator.len());
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }
    grouped
}
