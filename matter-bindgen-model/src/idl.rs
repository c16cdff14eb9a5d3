//! Parser for the `.matter` device-description IDL.
//!
//! Only the cluster surface that binding generation consumes is parsed:
//! clusters with their enums, bitmaps, structs, attributes, commands and
//! events. Access-control annotations are accepted and discarded since the
//! client binding surface does not depend on them.

use miette::{Diagnostic, NamedSource, SourceSpan};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{digit1, hex_digit1, multispace1, space1},
    combinator::{map, opt, recognize, value},
    error::ErrorKind,
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, tuple},
    IResult, Parser,
};
use nom_greedyerror::GreedyError;
use nom_locate::LocatedSpan;
use nom_supreme::ParserExt;
use thiserror::Error;
use tracing::warn;

use crate::{
    Attribute, Bitmap, Cluster, Command, ConstantEntry, DataType, Enum, Event, EventPriority,
    Field, Idl, Struct, StructField, StructType,
};

// easier to type and not move str around
type Span<'a> = LocatedSpan<&'a str>;
type ParseError<'a> = GreedyError<Span<'a>, ErrorKind>;

/// Fetch the deepest location of an error within an error type
pub trait DeepestIndex {
    fn deepest_index(&self) -> Option<usize>;
}

impl<E> DeepestIndex for nom::Err<E>
where
    E: DeepestIndex,
{
    fn deepest_index(&self) -> Option<usize> {
        match self {
            nom::Err::Error(e) => e.deepest_index(),
            nom::Err::Failure(e) => e.deepest_index(),
            nom::Err::Incomplete(_) => None,
        }
    }
}

impl DeepestIndex for GreedyError<Span<'_>, ErrorKind> {
    fn deepest_index(&self) -> Option<usize> {
        self.errors.iter().map(|(p, _k)| p.location_offset()).max()
    }
}

/// Parses a hex-formated integer
///
/// Examples:
///
/// ```
/// use matter_bindgen_model::idl::hex_integer;
///
/// let result = hex_integer("0x12 abc".into()).expect("Valid");
/// assert_eq!(result.0.fragment().to_string(), " abc");
/// assert_eq!(result.1, 0x12);
/// ```
pub fn hex_integer(span: Span) -> IResult<Span, u64, ParseError> {
    let (rest, digits) = hex_digit1::<Span, ParseError>
        .preceded_by(tag_no_case("0x"))
        .parse(span)?;

    match u64::from_str_radix(digits.fragment(), 16) {
        Ok(n) => Ok((rest, n)),
        Err(_) => Err(integer_overflow(span)),
    }
}

/// Parses a decimal-formated integer
pub fn decimal_integer(span: Span) -> IResult<Span, u64, ParseError> {
    let (rest, digits) = digit1::<Span, ParseError>.parse(span)?;

    match digits.fragment().parse::<u64>() {
        Ok(n) => Ok((rest, n)),
        Err(_) => Err(integer_overflow(span)),
    }
}

// literals wider than u64 are a parse error, not an abort
fn integer_overflow(span: Span) -> nom::Err<ParseError> {
    nom::Err::Error(nom::error::ParseError::from_error_kind(
        span,
        ErrorKind::TooLarge,
    ))
}

/// Parses a positive integer (hex or decimal)
///
/// Examples:
///
/// ```
/// use matter_bindgen_model::idl::positive_integer;
///
/// let result = positive_integer("12abctest".into()).expect("Valid");
/// assert_eq!(result.0.fragment().to_string(), "abctest");
/// assert_eq!(result.1, 12);
///
/// let result = positive_integer("0x12abctest".into()).expect("Valid");
/// assert_eq!(result.0.fragment().to_string(), "test");
/// assert_eq!(result.1, 0x12abc);
/// ```
pub fn positive_integer(span: Span) -> IResult<Span, u64, ParseError> {
    // NOTE: order is important so that
    // 0x123 is a hex not 0 followed by "x123"
    if let Ok(r) = hex_integer.parse(span) {
        return Ok(r);
    }
    decimal_integer.parse(span)
}

/// Represents a documentation comment (i.e. something between `/** ... */`)
/// placed before an element to document it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocComment<'a>(pub &'a str);

/// Information returned while parsing whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Whitespace<'a> {
    DocComment(&'a str), // /** ... */
    CppComment(&'a str), // /* ... */ (and NOT a doc comment)
    CComment(&'a str),   // // ....
    Whitespace(&'a str), // general newline/space/tab
}

/// Parses one whitespace group (spaces or a single comment).
pub fn whitespace_group(span: Span) -> IResult<Span, Whitespace<'_>, ParseError> {
    // NOTE: split into cases intentional. An alt() chain here measurably
    //       slows parsing down since whitespace runs between every token.

    if let Ok((span, c)) = preceded(tag::<_, _, ()>("//"), is_not("\n\r")).parse(span) {
        return Ok((span, Whitespace::CComment(c.fragment())));
    }

    // CPP-comment. May be a doc-comment if starting with '/**'
    if let Ok((span, cpp)) =
        delimited(tag::<_, _, ()>("/*"), take_until("*/"), tag("*/")).parse(span)
    {
        return Ok((
            span,
            if cpp.starts_with('*') {
                Whitespace::DocComment(&cpp.fragment()[1..])
            } else {
                Whitespace::CppComment(cpp.fragment())
            },
        ));
    }

    multispace1
        .map(|c: Span| Whitespace::Whitespace(c.fragment()))
        .parse(span)
}

/// Parses 0 or more whitespaces. It can NEVER fail.
///
/// If the last comment in the whitespace run is a doc-comment, that
/// doc-comment is returned.
///
/// Examples:
///
/// ```
/// use matter_bindgen_model::idl::{whitespace0, DocComment};
///
/// let result = whitespace0(" /**doc comment*/\n abc".into()).expect("Valid");
/// assert_eq!(result.0.fragment().to_string(), "abc");
/// assert_eq!(result.1, Some(DocComment("doc comment")));
///
/// let result = whitespace0("no whitespace".into()).expect("Valid");
/// assert_eq!(result.0.fragment().to_string(), "no whitespace");
/// assert_eq!(result.1, None);
/// ```
pub fn whitespace0(span: Span) -> IResult<Span, Option<DocComment>, ParseError> {
    // early bail out if the next char cannot start whitespace
    match span.chars().next() {
        Some('\r' | '\n' | '\t' | ' ' | '/') => (),
        _ => return Ok((span, None)),
    }

    let (mut rest, mut doc) = match whitespace_group(span) {
        Err(_) => return Ok((span, None)),
        Ok((span, Whitespace::DocComment(c))) => (span, Some(DocComment(c))),
        Ok((span, _)) => (span, None),
    };

    loop {
        match whitespace_group(rest) {
            Ok((span, whitespace)) => {
                rest = span;
                match whitespace {
                    Whitespace::DocComment(comment) => doc = Some(DocComment(comment)),
                    // any non-doc comment detaches a previous doc comment
                    Whitespace::CComment(_) | Whitespace::CppComment(_) => doc = None,
                    Whitespace::Whitespace(_) => {}
                }
            }
            Err(_) => return Ok((rest, doc)),
        }
    }
}

/// Parses at least one whitespace, returning the trailing doc-comment if any.
pub fn whitespace1(span: Span) -> IResult<Span, Option<DocComment>, ParseError> {
    let parsed = whitespace0(span)?;

    if span == parsed.0 {
        // this WILL fail, using it as such just to get a proper error
        space1::<_, ParseError>(span)?;
    }

    Ok(parsed)
}

/// Parses a name id, of the form /[a-zA-Z_][a-zA-Z0-9_]*/
pub fn parse_id(span: Span) -> IResult<Span, &str, ParseError> {
    let valid_first = |c: char| c.is_ascii_alphabetic() || c == '_';
    let valid_second = |c: char| c.is_ascii_alphanumeric() || c == '_';
    map(
        recognize(tuple((take_while1(valid_first), take_while(valid_second)))),
        |data: Span| *data.fragment(),
    )(span)
}

/// Grabs a set of whitespace-separated quality tags out of the given list.
macro_rules! tags_set {
    ($span:ident, $($tags:expr),+) => {{
        let mut result = std::collections::HashSet::new();
        let mut rest = $span;
        loop {
           let mut element_start = rest;
           if !result.is_empty() {
               match whitespace1.parse(element_start) {
                   Ok((p, _)) => element_start = p,
                   Err(_) => break,
               }
           }

           $(
           if let Ok((tail, tag)) = nom::bytes::complete::tag_no_case::<_,_,()>($tags).parse(element_start) {
               rest = tail;
               result.insert(*tag.fragment());
               continue;
           } else
           )+
           {
              break;
           }
        }
        (rest, result)
    }
    };
}

/// Parses an `access(...)` annotation and throws its content away.
///
/// Access control has no bearing on the generated client bindings, but real
/// device descriptions carry these annotations on attributes, commands and
/// events, so they must at least be consumed.
fn discarded_access_annotation(span: Span) -> IResult<Span, (), ParseError> {
    value(
        (),
        opt(delimited(
            tuple((whitespace0, tag_no_case("access"), whitespace0, tag("("))),
            separated_list0(
                tag(","),
                tuple((whitespace0, parse_id, whitespace0, tag(":"), whitespace0, parse_id)),
            ),
            tuple((whitespace0, tag(")"))),
        )),
    )
    .parse(span)
}

/// Parses a IDL representation of a constant entry, consuming any leading
/// whitespace.
///
/// Examples:
///
/// ```
/// use matter_bindgen_model::ConstantEntry;
/// use matter_bindgen_model::idl::constant_entry;
///
/// let parsed = constant_entry(" kConstant = 0x123 ;".into()).expect("valid");
/// assert_eq!(parsed.0.fragment().to_string(), "");
/// assert_eq!(parsed.1, ConstantEntry { id: "kConstant".into(), code: 0x123 });
/// ```
pub fn constant_entry(span: Span) -> IResult<Span, ConstantEntry, ParseError> {
    tuple((
        whitespace0,
        parse_id,
        whitespace0,
        tag("="),
        whitespace0,
        positive_integer,
        whitespace0,
        tag(";"),
    ))
    .map(|(_, id, _, _, _, code, _, _)| ConstantEntry {
        id: id.into(),
        code,
    })
    .parse(span)
}

/// Parses a list of constant entries, delimited by "{" "}".
fn constant_entries_list(span: Span) -> IResult<Span, Vec<ConstantEntry>, ParseError> {
    delimited(
        tag("{"),
        tuple((many0(constant_entry), whitespace0)),
        tag("}"),
    )
    .map(|(v, _)| v)
    .parse(span)
}

pub fn parse_enum(span: Span) -> IResult<Span, Enum, ParseError> {
    let (span, doc_comment) = whitespace0(span)?;
    let doc_comment = doc_comment.map(|DocComment(c)| c);

    parse_enum_after_doc(doc_comment, span)
}

fn parse_enum_after_doc<'a>(
    doc_comment: Option<&str>,
    span: Span<'a>,
) -> IResult<Span<'a>, Enum, ParseError<'a>> {
    tuple((
        tag_no_case("enum"),
        whitespace1,
        parse_id,
        whitespace0,
        tag(":"),
        whitespace0,
        parse_id,
        whitespace0,
        constant_entries_list,
    ))
    .map(|(_, _, id, _, _, _, base_type, _, entries)| Enum {
        doc_comment: doc_comment.map(|x| x.into()),
        id: id.into(),
        base_type: base_type.into(),
        entries,
    })
    .parse(span)
}

pub fn parse_bitmap(span: Span) -> IResult<Span, Bitmap, ParseError> {
    let (span, doc_comment) = whitespace0(span)?;
    let doc_comment = doc_comment.map(|DocComment(c)| c);

    parse_bitmap_after_doc(doc_comment, span)
}

fn parse_bitmap_after_doc<'a>(
    doc_comment: Option<&str>,
    span: Span<'a>,
) -> IResult<Span<'a>, Bitmap, ParseError<'a>> {
    tuple((
        tag_no_case("bitmap"),
        whitespace1,
        parse_id,
        whitespace0,
        tag(":"),
        whitespace0,
        parse_id,
        whitespace0,
        constant_entries_list,
    ))
    .map(|(_, _, id, _, _, _, base_type, _, entries)| Bitmap {
        doc_comment: doc_comment.map(|c| c.into()),
        id: id.into(),
        base_type: base_type.into(),
        entries,
    })
    .parse(span)
}

pub fn parse_field(span: Span) -> IResult<Span, Field, ParseError> {
    tuple((
        whitespace0,
        parse_id,
        opt(tuple((
            whitespace0,
            tag("<"),
            whitespace0,
            positive_integer,
            whitespace0,
            tag(">"),
        ))
        .map(|(_, _, _, len, _, _)| len)),
        whitespace1,
        parse_id,
        whitespace0,
        opt(tuple((tag("["), whitespace0, tag("]"), whitespace0))),
        tag("="),
        whitespace0,
        positive_integer,
    ))
    .map(
        |(_, type_name, max_length, _, id, _, list_marker, _, _, code)| Field {
            data_type: DataType {
                name: type_name.into(),
                is_list: list_marker.is_some(),
                max_length,
            },
            id: id.into(),
            code,
        },
    )
    .parse(span)
}

pub fn parse_struct_field(span: Span) -> IResult<Span, StructField, ParseError> {
    let (span, _) = whitespace0.parse(span)?;
    let (span, qualities) = tags_set!(span, "optional", "nullable", "fabric_sensitive");

    let is_optional = qualities.contains("optional");
    let is_nullable = qualities.contains("nullable");
    let is_fabric_sensitive = qualities.contains("fabric_sensitive");

    let (span, field) = parse_field(span)?;

    Ok((
        span,
        StructField {
            field,
            is_optional,
            is_nullable,
            is_fabric_sensitive,
        },
    ))
}

fn struct_fields(span: Span) -> IResult<Span, Vec<StructField>, ParseError> {
    delimited(
        tag("{"),
        many0(delimited(
            whitespace0,
            parse_struct_field,
            tuple((whitespace0, tag(";"))),
        )),
        tuple((whitespace0, tag("}"))),
    )
    .parse(span)
}

pub fn parse_struct(span: Span) -> IResult<Span, Struct, ParseError> {
    let (span, doc_comment) = whitespace0.parse(span)?;
    let doc_comment = doc_comment.map(|DocComment(s)| s);

    parse_struct_after_doc(doc_comment, span)
}

fn parse_struct_after_doc<'a>(
    doc_comment: Option<&str>,
    span: Span<'a>,
) -> IResult<Span<'a>, Struct, ParseError<'a>> {
    let (span, struct_type) = opt(alt((tag_no_case("request"), tag_no_case("response"))))(span)?;
    let struct_type = struct_type.map(|f| *f.fragment());

    let (span, _) = whitespace0.parse(span)?;

    let (span, qualities) = tags_set!(span, "fabric_scoped");
    let is_fabric_scoped = qualities.contains("fabric_scoped");

    let (span, id) = delimited(
        tuple((whitespace0, tag_no_case("struct"), whitespace1)),
        parse_id,
        whitespace0,
    )
    .parse(span)?;

    let (span, struct_type) = match struct_type {
        Some("request") => (span, StructType::Request),
        Some("response") => tuple((tag("="), whitespace0, positive_integer, whitespace0))
            .map(|(_, _, id, _)| StructType::Response(id))
            .parse(span)?,
        _ => (span, StructType::Regular),
    };

    let (span, fields) = struct_fields(span)?;

    Ok((
        span,
        Struct {
            doc_comment: doc_comment.map(|c| c.into()),
            struct_type,
            id: id.into(),
            fields,
            is_fabric_scoped,
        },
    ))
}

pub fn event_priority(span: Span) -> IResult<Span, EventPriority, ParseError> {
    if let Ok((span, _)) = tag_no_case::<_, _, ()>("info").parse(span) {
        return Ok((span, EventPriority::Info));
    }

    if let Ok((span, _)) = tag_no_case::<_, _, ()>("critical").parse(span) {
        return Ok((span, EventPriority::Critical));
    }

    value(EventPriority::Debug, tag_no_case("debug")).parse(span)
}

pub fn parse_event(span: Span) -> IResult<Span, Event, ParseError> {
    let (span, doc_comment) = whitespace0.parse(span)?;
    let doc_comment = doc_comment.map(|DocComment(s)| s);

    parse_event_after_doc(doc_comment, span)
}

fn parse_event_after_doc<'a>(
    doc_comment: Option<&str>,
    span: Span<'a>,
) -> IResult<Span<'a>, Event, ParseError<'a>> {
    let (span, qualities) = tags_set!(span, "fabric_sensitive");
    let is_fabric_sensitive = qualities.contains("fabric_sensitive");

    tuple((
        preceded(whitespace0, event_priority),
        whitespace1,
        tag_no_case("event"),
        discarded_access_annotation,
        preceded(whitespace0, parse_id),
        preceded(
            tuple((whitespace0, tag("="), whitespace0)),
            positive_integer,
        ),
        preceded(whitespace0, struct_fields),
    ))
    .map(|(priority, _, _, _, id, code, fields)| Event {
        doc_comment: doc_comment.map(|c| c.into()),
        priority,
        id: id.into(),
        code,
        fields,
        is_fabric_sensitive,
    })
    .parse(span)
}

pub fn parse_command(span: Span) -> IResult<Span, Command, ParseError> {
    let (span, doc_comment) = whitespace0.parse(span)?;
    let doc_comment = doc_comment.map(|DocComment(s)| s);

    parse_command_after_doc(doc_comment, span)
}

fn parse_command_after_doc<'a>(
    doc_comment: Option<&str>,
    span: Span<'a>,
) -> IResult<Span<'a>, Command, ParseError<'a>> {
    // `fabric` is an access-control quality, consumed but not modeled
    let (span, qualities) = tags_set!(span, "timed", "fabric");
    let is_timed = qualities.contains("timed");

    tuple((
        tuple((whitespace0, tag_no_case("command"))),
        discarded_access_annotation,
        whitespace0,
        parse_id,
        tuple((whitespace0, tag("("), whitespace0)),
        opt(parse_id),
        tuple((whitespace0, tag(")"), whitespace0, tag(":"), whitespace0)),
        parse_id,
        tuple((whitespace0, tag("="), whitespace0)),
        positive_integer,
        tuple((whitespace0, tag(";"))),
    ))
    .map(|(_, _, _, id, _, input, _, output, _, code, _)| Command {
        doc_comment: doc_comment.map(|c| c.into()),
        id: id.into(),
        input: input.map(|i| i.into()),
        output: output.into(),
        code,
        is_timed,
    })
    .parse(span)
}

pub fn parse_attribute(span: Span) -> IResult<Span, Attribute, ParseError> {
    let (span, doc_comment) = whitespace0.parse(span)?;
    let doc_comment = doc_comment.map(|DocComment(s)| s);

    parse_attribute_after_doc(doc_comment, span)
}

fn parse_attribute_after_doc<'a>(
    doc_comment: Option<&str>,
    span: Span<'a>,
) -> IResult<Span<'a>, Attribute, ParseError<'a>> {
    let (span, qualities) = tags_set!(span, "readonly", "nosubscribe", "timedwrite");
    let is_read_only = qualities.contains("readonly");
    let is_no_subscribe = qualities.contains("nosubscribe");
    let is_timed_write = qualities.contains("timedwrite");

    tuple((
        whitespace0,
        tag_no_case("attribute"),
        discarded_access_annotation,
        whitespace0,
        parse_struct_field,
        whitespace0,
        tag(";"),
    ))
    .map(|(_, _, _, _, field, _, _)| Attribute {
        doc_comment: doc_comment.map(|c| c.into()),
        field,
        is_read_only,
        is_no_subscribe,
        is_timed_write,
    })
    .parse(span)
}

fn parse_cluster_member<'a>(c: &mut Cluster, span: Span<'a>) -> Option<Span<'a>> {
    let (span, doc_comment) = whitespace0
        .map(|o| o.map(|DocComment(s)| s))
        .parse(span)
        .ok()?;

    if let Ok((rest, revision)) = delimited(
        tuple((tag_no_case("revision"), whitespace1)),
        positive_integer,
        tuple((whitespace0, tag(";"))),
    )
    .parse(span)
    {
        c.revision = revision;
        return Some(rest);
    }

    if let Ok((rest, b)) = parse_bitmap_after_doc(doc_comment, span) {
        c.bitmaps.push(b);
        return Some(rest);
    }
    if let Ok((rest, e)) = parse_enum_after_doc(doc_comment, span) {
        c.enums.push(e);
        return Some(rest);
    }
    if let Ok((rest, s)) = parse_struct_after_doc(doc_comment, span) {
        c.structs.push(s);
        return Some(rest);
    }
    if let Ok((rest, a)) = parse_attribute_after_doc(doc_comment, span) {
        c.attributes.push(a);
        return Some(rest);
    }
    if let Ok((rest, cmd)) = parse_command_after_doc(doc_comment, span) {
        c.commands.push(cmd);
        return Some(rest);
    }
    if let Ok((rest, e)) = parse_event_after_doc(doc_comment, span) {
        c.events.push(e);
        return Some(rest);
    }
    None
}

pub fn parse_cluster(span: Span) -> IResult<Span, Cluster, ParseError> {
    let (span, doc_comment) = whitespace0(span)?;
    let doc_comment = doc_comment.map(|DocComment(c)| c);

    let (span, mut cluster) = delimited(
        tuple((
            opt(tuple((
                alt((tag_no_case("client"), tag_no_case("server"))),
                whitespace1,
            ))),
            tag_no_case("cluster"),
            whitespace1,
        )),
        tuple((
            parse_id,
            whitespace0,
            tag("="),
            whitespace0,
            positive_integer,
        )),
        whitespace0,
    )
    .map(|(id, _, _, _, code)| Cluster {
        doc_comment: doc_comment.map(|c| c.into()),
        id: id.into(),
        code,
        ..Default::default()
    })
    .parse(span)?;

    let (mut span, _) = tag("{").parse(span)?;
    while let Some(rest) = parse_cluster_member(&mut cluster, span) {
        span = rest;
    }

    // finally consume the final tag
    value(cluster, tuple((whitespace0, tag("}")))).parse(span)
}

/// A parse failure, pointing at the deepest position the parser reached.
#[derive(Error, Debug, Diagnostic)]
#[error("Failed to parse IDL.")]
#[diagnostic(
    code("matter::bindgen::idl::parse"),
    help("Failed to parse IDL. Check IDL format")
)]
pub struct IdlParseError {
    #[source_code]
    pub src: NamedSource,

    #[label("Parse error location")]
    pub error_location: SourceSpan,
}

impl IdlParseError {
    fn new<'a>(input: Span<'a>, span: Span<'a>, error: nom::Err<ParseError<'a>>) -> Self {
        let pos = match error.deepest_index() {
            None => input.len() - span.len(),
            Some(error_pos) => error_pos,
        };

        warn!("IDL parse error: {:?}", error);

        IdlParseError {
            src: NamedSource::new("input idl", input.fragment().to_string()),
            error_location: (pos, 1).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TopLevelItem {
    Cluster(Cluster),
    Whitespace,
}

impl Idl {
    /// Parse a full device-description document.
    pub fn parse(input: &str) -> Result<Idl, IdlParseError> {
        let input: Span = input.into();
        let mut idl = Idl::default();

        let mut span = input;
        while !span.is_empty() {
            let (rest, item) = alt((
                parse_cluster.map(TopLevelItem::Cluster),
                value(TopLevelItem::Whitespace, whitespace1),
            ))
            .parse(span)
            .map_err(|e| IdlParseError::new(input, span, e))?;

            if let TopLevelItem::Cluster(c) = item {
                idl.clusters.push(c);
            }
            span = rest;
        }

        Ok(idl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_parse_ok<R: PartialEq + std::fmt::Debug>(
        parsed: IResult<Span, R, ParseError>,
        expected: R,
    ) {
        let actual = parsed.expect("Parse should have succeeded").1;
        assert_eq!(actual, expected);
    }

    #[test]
    fn parse_idl_error() {
        assert!(Idl::parse("/* Invalid IDL */ cluster X = 1 { invalid }").is_err());
    }

    #[test]
    fn oversized_integers_fail_cleanly() {
        // 17 hex digits / 20 decimal digits do not fit an u64
        assert!(hex_integer("0x11111111111111111".into()).is_err());
        assert!(decimal_integer("99999999999999999999".into()).is_err());

        // and the document as a whole reports a parse error
        assert!(Idl::parse("cluster X = 0xFFFFFFFFFFFFFFFFF {}").is_err());
        assert!(Idl::parse("cluster X = 99999999999999999999 {}").is_err());
    }

    #[rstest]
    #[case("kOne = 1;", ConstantEntry { id: "kOne".into(), code: 1 })]
    #[case("  kTwo = 0x2 ;", ConstantEntry { id: "kTwo".into(), code: 2 })]
    fn test_parse_constant_entry(#[case] input: &str, #[case] expected: ConstantEntry) {
        assert_parse_ok(constant_entry(input.into()), expected);
    }

    #[test]
    fn test_parse_enum() {
        assert_parse_ok(
            parse_enum(
                "
                enum EffectIdentifierEnum : enum8 {
                  kBlink = 0;
                  kBreathe = 1;
                }"
                .into(),
            ),
            Enum {
                doc_comment: None,
                id: "EffectIdentifierEnum".into(),
                base_type: "enum8".into(),
                entries: vec![
                    ConstantEntry {
                        id: "kBlink".into(),
                        code: 0,
                    },
                    ConstantEntry {
                        id: "kBreathe".into(),
                        code: 1,
                    },
                ],
            },
        );
    }

    #[test]
    fn test_parse_attribute() {
        assert_parse_ok(
            parse_attribute("attribute int16u identifyTime = 123;".into()),
            Attribute {
                doc_comment: None,
                field: StructField {
                    field: Field {
                        data_type: DataType::scalar("int16u"),
                        id: "identifyTime".into(),
                        code: 123,
                    },
                    is_optional: false,
                    is_nullable: false,
                    is_fabric_sensitive: false,
                },
                is_read_only: false,
                is_no_subscribe: false,
                is_timed_write: false,
            },
        );

        assert_parse_ok(
            parse_attribute(
                "
            /**mix of tests*/
            readonly nosubscribe
               attribute
               access(read: manage)
               optional boolean x[] = 0x123
            ;"
                .into(),
            ),
            Attribute {
                doc_comment: Some("mix of tests".into()),
                field: StructField {
                    field: Field {
                        data_type: DataType::list_of("boolean"),
                        id: "x".into(),
                        code: 0x123,
                    },
                    is_optional: true,
                    is_nullable: false,
                    is_fabric_sensitive: false,
                },
                is_read_only: true,
                is_no_subscribe: true,
                is_timed_write: false,
            },
        );
    }

    #[test]
    fn test_parse_command() {
        assert_parse_ok(
            parse_command("
            /** Test with many options. */
            fabric timed command access(invoke: administer) GetSetupPIN(GetSetupPINRequest): GetSetupPINResponse = 0;
            ".into()),
            Command {
                doc_comment: Some(" Test with many options. ".into()),
                id: "GetSetupPIN".into(),
                input: Some("GetSetupPINRequest".into()),
                output: "GetSetupPINResponse".into(),
                code: 0,
                is_timed: true,
            });

        assert_parse_ok(
            parse_command("command TestVeryBasic(): DefaultSuccess = 0x123;".into()),
            Command {
                doc_comment: None,
                id: "TestVeryBasic".into(),
                input: None,
                output: "DefaultSuccess".into(),
                code: 0x123,
                is_timed: false,
            },
        );
    }

    #[test]
    fn test_parse_event() {
        assert_parse_ok(
            parse_event(
                "
              /** this is a catch-all */
              fabric_sensitive info event access(read: administer) AccessControlEntryChanged = 0 {
                nullable node_id adminNodeID = 1;
                fabric_idx fabricIndex = 254;
              }"
                .into(),
            ),
            Event {
                doc_comment: Some(" this is a catch-all ".into()),
                priority: EventPriority::Info,
                id: "AccessControlEntryChanged".into(),
                code: 0,
                is_fabric_sensitive: true,
                fields: vec![
                    StructField {
                        field: Field {
                            data_type: DataType::scalar("node_id"),
                            id: "adminNodeID".into(),
                            code: 1,
                        },
                        is_optional: false,
                        is_nullable: true,
                        is_fabric_sensitive: false,
                    },
                    StructField {
                        field: Field {
                            data_type: DataType::scalar("fabric_idx"),
                            id: "fabricIndex".into(),
                            code: 254,
                        },
                        is_optional: false,
                        is_nullable: false,
                        is_fabric_sensitive: false,
                    },
                ],
            },
        );
    }

    #[test]
    fn test_parse_struct() {
        assert_parse_ok(
            parse_struct(
                "
                fabric_scoped struct AccessControlEntryStruct {
                  fabric_sensitive int8u privilege = 1;
                  optional nullable char_string<64> label = 2;
                }"
                .into(),
            ),
            Struct {
                doc_comment: None,
                struct_type: StructType::Regular,
                id: "AccessControlEntryStruct".into(),
                is_fabric_scoped: true,
                fields: vec![
                    StructField {
                        field: Field {
                            data_type: DataType::scalar("int8u"),
                            id: "privilege".into(),
                            code: 1,
                        },
                        is_optional: false,
                        is_nullable: false,
                        is_fabric_sensitive: true,
                    },
                    StructField {
                        field: Field {
                            data_type: DataType {
                                name: "char_string".into(),
                                is_list: false,
                                max_length: Some(64),
                            },
                            id: "label".into(),
                            code: 2,
                        },
                        is_optional: true,
                        is_nullable: true,
                        is_fabric_sensitive: false,
                    },
                ],
            },
        );
    }

    #[test]
    fn test_parse_cluster() {
        let (_, cluster) = parse_cluster(
            "
          /** Attributes and commands for putting a device into Identification mode */
          cluster Identify = 3 {
             revision 4;

             enum EffectIdentifierEnum : enum8 {
               kBlink = 0;
               kBreathe = 1;
             }

             request struct IdentifyRequest {
               int16u identifyTime = 0;
             }

             response struct IdentifyQueryResponse = 1 {
               int16u timeout = 0;
             }

             attribute int16u identifyTime = 0;
             readonly attribute enum8 identifyType = 1;

             command Identify(IdentifyRequest): DefaultSuccess = 0;
             command IdentifyQuery(): IdentifyQueryResponse = 1;

             info event StateChanged = 0 {
               int16u actionID = 0;
             }
          }
        "
            .into(),
        )
        .expect("valid cluster");

        assert_eq!(cluster.id, "Identify");
        assert_eq!(cluster.code, 3);
        assert_eq!(cluster.revision, 4);
        assert_eq!(cluster.enums.len(), 1);
        assert_eq!(cluster.structs.len(), 2);
        assert_eq!(cluster.attributes.len(), 2);
        assert_eq!(cluster.commands.len(), 2);
        assert_eq!(cluster.events.len(), 1);

        assert_eq!(
            cluster.doc_comment.as_deref(),
            Some(" Attributes and commands for putting a device into Identification mode ")
        );
        assert!(cluster.attributes[0].is_writable());
        assert!(!cluster.attributes[1].is_writable());
        assert!(cluster.commands[0].input.is_some());
        assert!(cluster.commands[0].is_status_only());
        assert!(!cluster.commands[1].is_status_only());
    }

    #[test]
    fn parse_idl_document() {
        let idl = Idl::parse(
            "
            // a document with two clusters
            cluster OnOff = 6 {
              readonly attribute boolean onOff = 0;
              command Toggle(): DefaultSuccess = 2;
            }

            cluster LevelControl = 8 {
              attribute nullable int8u currentLevel = 0;
            }
            ",
        )
        .expect("valid document");

        assert_eq!(idl.clusters.len(), 2);
        assert_eq!(idl.clusters[0].id, "OnOff");
        assert_eq!(idl.clusters[1].id, "LevelControl");
        assert!(idl.cluster_named("LevelControl").is_some());
        assert!(idl.cluster_named("Missing").is_none());
    }
}
