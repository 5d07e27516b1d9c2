//! Filter expressions for the `where` request parameter.
//!
//! Expressions render to the API's textual filter syntax:
//! `field.op.value`, `field.op.(v1,v2,...)`, `and(...)` and `or(...)`.
//!
//! ```
//! use odhts::filter::{self, and, eq, in_, or};
//!
//! let expr = and([
//!     or([eq("scode", "123"), eq("scode", &filter::escape("a,b"))]),
//!     in_("mvalue", ["1", "2"]),
//! ]);
//! assert_eq!(
//!     expr.render(),
//!     r#"and(or(scode.eq.123,scode.eq."a\,b"),mvalue.in.(1,2))"#
//! );
//! ```
//!
//! Value operators do not escape anything themselves. Use [`escape`] or
//! [`escape_list`] for literal strings.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Spatial reference id for WGS84 longitude/latitude, the API default
pub const SRID_4326: &str = "4326";

static SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\\,'"])"#).expect("static pattern compiles"));

/// A rendered filter predicate.
///
/// Values are immutable; combinators take their children by value and
/// build a new expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr(String);

impl Expr {
    /// Final textual form, ready for the `where` parameter
    pub fn render(&self) -> String {
        self.0.clone()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> Self {
        expr.0
    }
}

fn val_op(field: &str, op: &str, value: &str) -> Expr {
    Expr(format!("{field}.{op}.{value}"))
}

fn list_op<I, S>(field: &str, op: &str, values: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    val_op(field, op, &format!("({})", join(values)))
}

fn logic_op<I>(op: &str, exprs: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    Expr(format!("{op}({})", join(exprs.into_iter().map(|e| e.0))))
}

fn join<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(v.as_ref());
    }
    out
}

fn coords(values: &[f32], srid: Option<&str>) -> String {
    let parts = values
        .iter()
        .map(|v| v.to_string())
        .chain(srid.map(str::to_string));
    format!("({})", join(parts))
}

/// Wrap a raw string as an expression, bypassing the grammar
pub fn custom(raw: impl Into<String>) -> Expr {
    Expr(raw.into())
}

/// Backslash-escape `\ , ' "` and wrap the result in double quotes
pub fn escape(value: &str) -> String {
    format!("\"{}\"", SPECIAL_CHARS.replace_all(value, r"\$1"))
}

/// [`escape`] every value, keeping order
pub fn escape_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values.into_iter().map(|v| escape(v.as_ref())).collect()
}

/// eq: Equal
pub fn eq(field: &str, value: &str) -> Expr {
    val_op(field, "eq", value)
}

/// neq: Not Equal
pub fn neq(field: &str, value: &str) -> Expr {
    val_op(field, "neq", value)
}

/// lt: Less Than
pub fn lt(field: &str, value: &str) -> Expr {
    val_op(field, "lt", value)
}

/// gt: Greater Than
pub fn gt(field: &str, value: &str) -> Expr {
    val_op(field, "gt", value)
}

/// lteq: Less Than Or Equal
pub fn lteq(field: &str, value: &str) -> Expr {
    val_op(field, "lteq", value)
}

/// gteq: Greater Than Or Equal
pub fn gteq(field: &str, value: &str) -> Expr {
    val_op(field, "gteq", value)
}

/// re: Regular Expression
pub fn re(field: &str, value: &str) -> Expr {
    val_op(field, "re", value)
}

/// ire: Case Insensitive Regular Expression
pub fn ire(field: &str, value: &str) -> Expr {
    val_op(field, "ire", value)
}

/// nre: Negated Regular Expression
pub fn nre(field: &str, value: &str) -> Expr {
    val_op(field, "nre", value)
}

/// nire: Negated Case Insensitive Regular Expression
pub fn nire(field: &str, value: &str) -> Expr {
    val_op(field, "nire", value)
}

/// in: true if any of the values match
pub fn in_<I, S>(field: &str, values: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    list_op(field, "in", values)
}

/// nin: true if none of the values match
pub fn nin<I, S>(field: &str, values: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    list_op(field, "nin", values)
}

/// Conjunction of all children, in order
pub fn and<I>(exprs: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    logic_op("and", exprs)
}

/// Disjunction of all children, in order
pub fn or<I>(exprs: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    logic_op("or", exprs)
}

/// bbi: bounding box intersects (geometry at least partially inside).
///
/// The server assumes [`SRID_4326`] when `srid` is `None`.
pub fn bbi(field: &str, lon1: f32, lat1: f32, lon2: f32, lat2: f32, srid: Option<&str>) -> Expr {
    val_op(field, "bbi", &coords(&[lon1, lat1, lon2, lat2], srid))
}

/// bbc: bounding box contains (geometry completely inside).
///
/// The server assumes [`SRID_4326`] when `srid` is `None`.
pub fn bbc(field: &str, lon1: f32, lat1: f32, lon2: f32, lat2: f32, srid: Option<&str>) -> Expr {
    val_op(field, "bbc", &coords(&[lon1, lat1, lon2, lat2], srid))
}

/// dlt: distance less than `distance_m` metres around a point
pub fn dlt(field: &str, distance_m: f32, lon: f32, lat: f32, srid: Option<&str>) -> Expr {
    val_op(field, "dlt", &coords(&[distance_m, lon, lat], srid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_expression() {
        let actual = and([
            or([
                eq("scode", "123"),
                neq("scode", "456"),
                lt("mvalue", "1"),
                gt("mvalue", "1"),
                lteq("mvalue", "1"),
                gteq("mvalue", "1"),
                re("sname", &escape("test.*")),
                ire("sname", &escape("test.*")),
                nre("sname", &escape("test.*")),
                nire("sname", &escape(r#"test,'"\"#)),
            ]),
            in_("mvalue", ["1", "2", "3"]),
            nin("mvalue", escape_list(["1", "2", "3"])),
            bbi("scoordinate", 11.3, 46.4, 12.0, 47.0, None),
            bbc("scoordinate", 11.3, 46.4567567, 12.0, 47.0, Some(SRID_4326)),
            dlt("scoordinate", 4000.0, 11.2, 46.7, Some(SRID_4326)),
        ]);

        let expected = concat!(
            "and(or(",
            "scode.eq.123,scode.neq.456,mvalue.lt.1,mvalue.gt.1,mvalue.lteq.1,mvalue.gteq.1,",
            r#"sname.re."test.*",sname.ire."test.*",sname.nre."test.*",sname.nire."test\,\'\"\\"),"#,
            r#"mvalue.in.(1,2,3),mvalue.nin.("1","2","3"),"#,
            "scoordinate.bbi.(11.3,46.4,12,47),scoordinate.bbc.(11.3,46.456757,12,47,4326),",
            "scoordinate.dlt.(4000,11.2,46.7,4326)",
            ")"
        );

        assert_eq!(actual.render(), expected);
    }

    #[test]
    fn test_nested_scenario() {
        let expr = and([
            or([eq("scode", "123"), neq("scode", "456")]),
            in_("mvalue", ["1", "2", "3"]),
            bbc("scoordinate", 11.3, 46.4567567, 12.0, 47.0, Some("4326")),
        ]);
        assert_eq!(
            expr.render(),
            "and(or(scode.eq.123,scode.neq.456),mvalue.in.(1,2,3),scoordinate.bbc.(11.3,46.456757,12,47,4326))"
        );
    }

    #[test]
    fn test_escape_special() {
        assert_eq!(
            escape(r#"test,test"test'test\"#),
            r#""test\,test\"test\'test\\""#
        );
        assert_eq!(escape("plain"), r#""plain""#);
        assert_eq!(escape(""), r#""""#);
    }

    #[test]
    fn test_escape_list_keeps_order() {
        assert_eq!(escape_list(["b", "a,"]), vec![r#""b""#, r#""a\,""#]);
    }

    #[test]
    fn test_in_keeps_order() {
        assert_eq!(in_("field", ["v3", "v1", "v2"]).render(), "field.in.(v3,v1,v2)");
        assert_eq!(nin("field", Vec::<String>::new()).render(), "field.nin.()");
    }

    #[test]
    fn test_empty_combinators() {
        assert_eq!(and(Vec::<Expr>::new()).render(), "and()");
        assert_eq!(or(std::iter::empty::<Expr>()).render(), "or()");
    }

    #[test]
    fn test_geometry_srid() {
        assert_eq!(
            bbi("g", 1.5, 2.0, 3.0, 4.25, None).render(),
            "g.bbi.(1.5,2,3,4.25)"
        );
        assert!(bbc("g", 1.0, 2.0, 3.0, 4.0, Some(SRID_4326))
            .render()
            .ends_with(",4326)"));
        assert_eq!(dlt("g", 100.0, 11.0, 46.5, None).render(), "g.dlt.(100,11,46.5)");
    }

    #[test]
    fn test_no_scientific_notation() {
        assert_eq!(dlt("g", 1.0e7, 0.0, 0.0, None).render(), "g.dlt.(10000000,0,0)");
    }

    #[test]
    fn test_custom_and_determinism() {
        let raw = custom("sname.ire.bolzano");
        let expr = and([raw.clone(), eq("a", "b")]);
        assert_eq!(expr.render(), expr.render());
        assert_eq!(expr.to_string(), "and(sname.ire.bolzano,a.eq.b)");
        assert_eq!(raw.as_str(), "sname.ire.bolzano");
    }
}
