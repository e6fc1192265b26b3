//! Flat text record format used by the bulk loader.
//!
//! Product record, one per file:
//!
//! ```text
//! D,101,Tea,1.99,0
//! F,103,Cake,3.99,5,2024-03-15
//! ```
//!
//! The leading discriminator selects the kind: `F` is perishable and must carry an
//! ISO best-before date, `D` is non-perishable. Fields are id, name, price and
//! rating ordinal. Names cannot contain commas.
//!
//! Review record, one per line of a review file: `<rating ordinal>,<comments>`.
//! Everything after the first comma is the comment, commas included.

use crate::{
    entities::{Product, ProductKind, Rating, Review},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Discriminator for perishable products.
pub const PERISHABLE_TAG: &str = "F";
/// Discriminator for non-perishable products.
pub const NON_PERISHABLE_TAG: &str = "D";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Decodes one product record.
///
/// # Errors
/// Returns `Error::Parse` if the discriminator is unknown, a field is missing or
/// extra, or any field fails to parse.
pub fn parse_product(line: &str) -> Result<Product> {
    let line = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    let expected = match fields.first().copied() {
        Some(PERISHABLE_TAG) => 6,
        Some(NON_PERISHABLE_TAG) => 5,
        other => {
            return Err(Error::parse(format!(
                "unknown product type {:?} in {line:?}",
                other.unwrap_or_default()
            )));
        }
    };
    if fields.len() != expected {
        return Err(Error::parse(format!(
            "expected {expected} fields, found {} in {line:?}",
            fields.len()
        )));
    }

    let id = fields[1]
        .parse::<i32>()
        .map_err(|e| Error::parse(format!("invalid id {:?}: {e}", fields[1])))?;
    let name = fields[2];
    if name.is_empty() {
        return Err(Error::parse(format!("empty product name in {line:?}")));
    }
    let price = Decimal::from_str(fields[3])
        .map_err(|e| Error::parse(format!("invalid price {:?}: {e}", fields[3])))?;
    let rating = parse_rating(fields[4])?;

    let best_before = match fields.get(5) {
        Some(text) => Some(
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map_err(|e| Error::parse(format!("invalid best-before date {text:?}: {e}")))?,
        ),
        None => None,
    };

    Ok(Product::new(id, name, price, rating, best_before))
}

/// Encodes a product as a record line, without trailing newline.
///
/// # Errors
/// Returns `Error::Parse` if the name contains a comma or line break, which the
/// format cannot represent.
pub fn format_product(product: &Product) -> Result<String> {
    let name = product.name();
    if name.contains([',', '\n', '\r']) {
        return Err(Error::parse(format!(
            "product name {name:?} cannot be stored in a record"
        )));
    }

    let id = product.id();
    let price = product.price();
    let rating = product.rating().ordinal();
    Ok(match product.kind() {
        ProductKind::Perishable { best_before } => format!(
            "{PERISHABLE_TAG},{id},{name},{price},{rating},{}",
            best_before.format(DATE_FORMAT)
        ),
        ProductKind::NonPerishable => {
            format!("{NON_PERISHABLE_TAG},{id},{name},{price},{rating}")
        }
    })
}

/// Decodes one review record.
///
/// # Errors
/// Returns `Error::Parse` if the separator is missing or the rating is invalid.
pub fn parse_review(line: &str) -> Result<Review> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (rating, comments) = line
        .split_once(',')
        .ok_or_else(|| Error::parse(format!("missing comma in review {line:?}")))?;
    Ok(Review::new(parse_rating(rating.trim())?, comments))
}

/// Encodes a review as a record line, without trailing newline.
///
/// # Errors
/// Returns `Error::Parse` if the comments contain a line break.
pub fn format_review(review: &Review) -> Result<String> {
    let comments = review.comments();
    if comments.contains(['\n', '\r']) {
        return Err(Error::parse("review comments cannot span lines"));
    }
    Ok(format!("{},{comments}", review.rating().ordinal()))
}

fn parse_rating(text: &str) -> Result<Rating> {
    let ordinal = text
        .parse::<i64>()
        .map_err(|e| Error::parse(format!("invalid rating {text:?}: {e}")))?;
    Rating::try_from(ordinal)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{price, test_date};

    #[test]
    fn test_parse_non_perishable() {
        let tea = parse_product("D,101,Tea,1.99,0").unwrap();
        assert_eq!(tea.id(), 101);
        assert_eq!(tea.name(), "Tea");
        assert_eq!(tea.price(), price("1.99"));
        assert_eq!(tea.rating(), Rating::NotRated);
        assert!(!tea.is_perishable());
    }

    #[test]
    fn test_parse_perishable_with_crlf() {
        let cake = parse_product("F,103,Cake,3.99,5,2024-03-15\r\n").unwrap();
        assert_eq!(cake.best_before(), Some(test_date()));
        assert_eq!(cake.rating(), Rating::FiveStar);
    }

    #[test]
    fn test_parse_product_rejects_malformed_records() {
        let bad = [
            "",
            "X,101,Tea,1.99,0",
            "D,101,Tea,1.99",
            "D,101,Tea,1.99,0,2024-03-15",
            "F,103,Cake,3.99,5",
            "D,abc,Tea,1.99,0",
            "D,101,,1.99,0",
            "D,101,Tea,cheap,0",
            "D,101,Tea,1.99,7",
            "F,103,Cake,3.99,5,15/03/2024",
        ];
        for line in bad {
            assert!(
                matches!(parse_product(line), Err(Error::Parse { .. })),
                "{line:?} should not parse"
            );
        }
    }

    #[test]
    fn test_format_product_matches_parse() {
        let cake = Product::perishable(103, "Cake", price("3.99"), Rating::FiveStar, test_date());
        assert_eq!(format_product(&cake).unwrap(), "F,103,Cake,3.99,5,2024-03-15");

        let tea = Product::non_perishable(101, "Tea", price("1.99"), Rating::FourStar);
        let line = format_product(&tea).unwrap();
        assert_eq!(line, "D,101,Tea,1.99,4");
        assert!(parse_product(&line).unwrap().same_values(&tea));
    }

    #[test]
    fn test_format_product_rejects_comma_in_name() {
        let odd = Product::non_perishable(1, "Salt, sea", price("1.00"), Rating::NotRated);
        assert!(format_product(&odd).is_err());
    }

    #[test]
    fn test_parse_review_keeps_commas_in_comments() {
        let review = parse_review("3,Fine, but a little sweet").unwrap();
        assert_eq!(review.rating(), Rating::ThreeStar);
        assert_eq!(review.comments(), "Fine, but a little sweet");
    }

    #[test]
    fn test_parse_review_rejects_malformed_lines() {
        assert!(parse_review("no separator").is_err());
        assert!(parse_review("six,great").is_err());
        assert!(parse_review("9,too good").is_err());
    }

    #[test]
    fn test_format_review() {
        let review = Review::new(Rating::TwoStar, "Rather weak tea");
        assert_eq!(format_review(&review).unwrap(), "2,Rather weak tea");
        assert!(format_review(&Review::new(Rating::OneStar, "two\nlines")).is_err());
    }
}
