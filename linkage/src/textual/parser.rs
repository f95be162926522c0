use super::{
    Label, Problem,
    instruction::{DeclarePoint, Distance, Drag, Fix, Instruction},
};
use crate::{TextualError, datatypes::Position};
use winnow::{
    Result as WResult,
    ascii::{digit1, space0, space1},
    combinator::{alt, delimited, opt, preceded},
    prelude::*,
    token::take_while,
};

/// Which `# section` the parser is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Points,
    Constraints,
    Drags,
}

impl Problem {
    /// Parse a whole problem. Each statement is one line.
    pub fn parse(text: &str) -> Result<Self, TextualError> {
        let mut problem = Problem::default();
        let mut section = None;
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let statement = strip_comment(raw).trim();
            if statement.is_empty() {
                continue;
            }
            if statement.starts_with('#') {
                section = Some(header.parse(statement).map_err(|e| syntax_error(line, e))?);
                continue;
            }
            match section {
                None => return Err(TextualError::MissingSection { line }),
                Some(Section::Points) => problem
                    .points
                    .push(DeclarePoint::parse.parse(statement).map_err(|e| syntax_error(line, e))?),
                Some(Section::Constraints) => problem
                    .instructions
                    .push(Instruction::parse.parse(statement).map_err(|e| syntax_error(line, e))?),
                Some(Section::Drags) => problem
                    .drags
                    .push(Drag::parse.parse(statement).map_err(|e| syntax_error(line, e))?),
            }
        }
        Ok(problem)
    }
}

fn syntax_error(line: usize, e: impl std::fmt::Display) -> TextualError {
    TextualError::Syntax {
        line,
        message: e.to_string(),
    }
}

/// Everything before a `//` comment.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(start) => &line[..start],
        None => line,
    }
}

fn header(i: &mut &str) -> WResult<Section> {
    preceded(
        ('#', ws),
        alt((
            "points".value(Section::Points),
            "constraints".value(Section::Constraints),
            "drags".value(Section::Drags),
        )),
    )
    .parse_next(i)
}

impl DeclarePoint {
    // p = (0, 0)
    fn parse(i: &mut &str) -> WResult<Self> {
        (Label::parse, ws, '=', ws, parse_position)
            .map(|(label, _, _, _, at)| Self { label, at })
            .parse_next(i)
    }
}

impl Instruction {
    fn parse(i: &mut &str) -> WResult<Self> {
        alt((
            Fix::parse.map(Instruction::Fix),
            Distance::parse.map(Instruction::Distance),
        ))
        .parse_next(i)
    }
}

impl Fix {
    // fixed(p) at (1, 2)
    fn parse(i: &mut &str) -> WResult<Self> {
        (
            "fixed",
            ws,
            delimited(('(', ws), Label::parse, (ws, ')')),
            opt(preceded((space1, "at", space1), parse_position)),
        )
            .map(|(_, _, point, at)| Self { point, at })
            .parse_next(i)
    }
}

impl Distance {
    // distance(p, q) = 300
    fn parse(i: &mut &str) -> WResult<Self> {
        (
            "distance",
            ws,
            delimited(
                ('(', ws),
                (Label::parse, ws, ',', ws, Label::parse),
                (ws, ')'),
            ),
            opt(preceded((ws, '=', ws), parse_number)),
        )
            .map(|(_, _, (p0, _, _comma, _, p1), length)| Self {
                label: (p0, p1),
                length,
            })
            .parse_next(i)
    }
}

impl Drag {
    // p by (1, 2) or p to (1, 2)
    fn parse(i: &mut &str) -> WResult<Self> {
        (
            Label::parse,
            space1,
            alt(("by".value(true), "to".value(false))),
            space1,
            parse_position,
        )
            .map(|(point, _, relative, _, Position { x, y })| {
                if relative {
                    Drag::By {
                        point,
                        dx: x,
                        dy: y,
                    }
                } else {
                    Drag::To { point, x, y }
                }
            })
            .parse_next(i)
    }
}

fn ws(i: &mut &str) -> WResult<()> {
    space0.parse_next(i).map(|_| ())
}

impl Label {
    fn parse(i: &mut &str) -> WResult<Label> {
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
            .map(|s: &str| Label(s.to_owned()))
            .parse_next(i)
    }
}

fn parse_position(input: &mut &str) -> WResult<Position> {
    delimited(
        ('(', ws),
        (parse_number, ws, ',', ws, parse_number).map(|(x, _, _comma, _, y)| Position { x, y }),
        (ws, ')'),
    )
    .parse_next(input)
}

fn parse_number(i: &mut &str) -> WResult<f64> {
    fn myint(input: &mut &str) -> WResult<f64> {
        digit1
            .verify_map(|s: &str| s.parse::<f64>().ok())
            .parse_next(input)
    }

    fn myfloat(i: &mut &str) -> WResult<f64> {
        winnow::ascii::float.parse_next(i)
    }
    alt((myfloat, myint)).parse_next(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number.parse("300").unwrap(), 300.0);
        assert_eq!(parse_number.parse("-2.5").unwrap(), -2.5);
    }

    #[test]
    fn test_statements() {
        assert_eq!(
            DeclarePoint::parse.parse("a = (200, -100.5)").unwrap(),
            DeclarePoint {
                label: Label::from("a"),
                at: Position { x: 200.0, y: -100.5 },
            }
        );
        assert_eq!(
            Instruction::parse.parse("fixed( b ) at (1,2)").unwrap(),
            Instruction::Fix(Fix {
                point: Label::from("b"),
                at: Some(Position { x: 1.0, y: 2.0 }),
            })
        );
        assert_eq!(
            Instruction::parse.parse("distance(a, b)").unwrap(),
            Instruction::Distance(Distance {
                label: (Label::from("a"), Label::from("b")),
                length: None,
            })
        );
        assert_eq!(
            Instruction::parse.parse("distance(c,d) = 300").unwrap(),
            Instruction::Distance(Distance {
                label: (Label::from("c"), Label::from("d")),
                length: Some(300.0),
            })
        );
        assert_eq!(
            Drag::parse.parse("c by (50, 0)").unwrap(),
            Drag::By {
                point: Label::from("c"),
                dx: 50.0,
                dy: 0.0,
            }
        );
        assert_eq!(
            Drag::parse.parse("d to (520, 90)").unwrap(),
            Drag::To {
                point: Label::from("d"),
                x: 520.0,
                y: 90.0,
            }
        );
    }

    #[test]
    fn rejects_trailing_junk() {
        assert!(Instruction::parse.parse("distance(a, b) 300").is_err());
        assert!(Drag::parse.parse("c by (50, 0) please").is_err());
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = Problem::parse("# points\na = (0, 0)\nb = 0, 0\n").unwrap_err();
        assert!(matches!(err, TextualError::Syntax { line: 3, .. }), "{err}");

        let err = Problem::parse("// just a comment\n\na = (0, 0)\n").unwrap_err();
        assert_eq!(err, TextualError::MissingSection { line: 3 });

        let err = Problem::parse("# shapes\n").unwrap_err();
        assert!(matches!(err, TextualError::Syntax { line: 1, .. }));
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let problem = Problem::parse(
            "\
# points
a = (0, 0) // origin

b = (3, 4)
# constraints
// keep them together
distance(a, b)
",
        )
        .unwrap();
        assert_eq!(problem.points.len(), 2);
        assert_eq!(problem.instructions.len(), 1);
        assert!(problem.drags.is_empty());
    }
}
