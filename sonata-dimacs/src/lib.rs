//! DIMACS CNF parser and writer for the Sonata SAT solver.

use std::{borrow::Borrow, io, mem::replace};

use sonata_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error(
        "line {}: Unexpected character in DIMACS CNF input: '{}'",
        line,
        unexpected
    )]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {}: Literal exceeds the supported variable count", line)]
    LiteralTooLarge { line: usize },
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error("Parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count of a DIMACS CNF header.
///
/// The header is advisory: the parsed formula is not required to match it. The variable count of
/// the formula is the maximum of the header count and the largest variable present.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Position within a DIMACS CNF token.
enum TokenState {
    /// Between tokens.
    Gap,
    /// Within a comment line.
    Comment,
    /// Within the `p cnf` header line.
    Header,
    /// Within a literal, after an optional minus sign.
    Number {
        value: usize,
        negative: bool,
        has_digits: bool,
    },
}

/// Parser for DIMACS CNF files.
///
/// The input can be consumed in chunks and the parsed formula can be taken out incrementally, so
/// neither the input text nor the complete formula has to be kept in memory.
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,
    expected_status: Option<bool>,

    state: TokenState,
    start_of_line: bool,
    line_number: usize,
    clause_count: usize,
    error: bool,

    line_buf: Vec<u8>,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,
            expected_status: None,

            state: TokenState::Gap,
            start_of_line: true,
            line_number: 1,
            clause_count: 0,
            error: false,

            line_buf: vec![],
        }
    }

    /// Parse the given input into a single [`CnfFormula`].
    ///
    /// Incremental parsing is possible using [`parse_incremental`](DimacsParser::parse_incremental)
    /// or the [`parse_chunk`](DimacsParser::parse_chunk) method.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        Ok(Self::parse_incremental(input, |_| Ok(()))?.take_formula())
    }

    /// Parse the given input incrementally.
    ///
    /// The callback is invoked after each chunk with a reference to the parser. It can process the
    /// formula incrementally by calling [`take_formula`](DimacsParser::take_formula) on the passed
    /// argument.
    pub fn parse_incremental(
        input: impl io::Read,
        mut callback: impl FnMut(&mut DimacsParser) -> Result<(), Error>,
    ) -> Result<DimacsParser, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            callback(&mut parser)?;
        }
        parser.eof()?;
        callback(&mut parser)?;

        Ok(parser)
    }

    /// Parse a chunk of input.
    ///
    /// After parsing the last chunk call the [`eof`](DimacsParser::eof) method.
    ///
    /// If this method returns an error, the parser is in an invalid state and cannot parse further
    /// chunks.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            if let Err(err) = self.parse_byte(byte) {
                self.error = true;
                return Err(err);
            }
            if byte == b'\n' {
                self.line_number += 1;
                self.start_of_line = true;
            } else if byte != b'\r' {
                self.start_of_line = false;
            }
        }

        Ok(())
    }

    /// Finish parsing the input.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }

        // A final newline is optional, pending tokens are finished as if one was present.
        if let Err(err) = self.parse_byte(b'\n') {
            self.error = true;
            return Err(err);
        }

        if !self.partial_clause.is_empty() {
            self.error = true;
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        Ok(())
    }

    fn parse_byte(&mut self, byte: u8) -> Result<(), ParserError> {
        match self.state {
            TokenState::Gap => match byte {
                b' ' | b'\t' | b'\n' | b'\r' => (),
                b'0'..=b'9' => {
                    self.state = TokenState::Number {
                        value: (byte - b'0') as usize,
                        negative: false,
                        has_digits: true,
                    };
                }
                b'-' => {
                    self.state = TokenState::Number {
                        value: 0,
                        negative: true,
                        has_digits: false,
                    };
                }
                b'c' if self.start_of_line => {
                    self.line_buf.clear();
                    self.state = TokenState::Comment;
                }
                b'p' if self.start_of_line && self.header.is_none() => {
                    self.line_buf.clear();
                    self.line_buf.push(b'p');
                    self.state = TokenState::Header;
                }
                _ => {
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    })
                }
            },
            TokenState::Comment => match byte {
                b'\n' => {
                    self.finish_comment();
                    self.state = TokenState::Gap;
                }
                b'\r' => (),
                _ => self.line_buf.push(byte),
            },
            TokenState::Header => match byte {
                b'\n' => {
                    self.parse_header_line()?;
                    self.state = TokenState::Gap;
                }
                b'\r' => (),
                _ => self.line_buf.push(byte),
            },
            TokenState::Number {
                ref mut value,
                negative,
                ref mut has_digits,
            } => match byte {
                b'0'..=b'9' => {
                    let next = *value * 10 + (byte - b'0') as usize;
                    if next > Var::max_count() {
                        return Err(ParserError::LiteralTooLarge {
                            line: self.line_number,
                        });
                    }
                    *value = next;
                    *has_digits = true;
                }
                b' ' | b'\t' | b'\n' | b'\r' if *has_digits => {
                    let value = *value;
                    self.finish_number(value, negative);
                    self.state = TokenState::Gap;
                }
                _ => {
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    })
                }
            },
        }
        Ok(())
    }

    fn finish_number(&mut self, value: usize, negative: bool) {
        if value == 0 {
            self.formula.add_clause(&self.partial_clause);
            self.partial_clause.clear();
            self.clause_count += 1;
        } else {
            self.partial_clause
                .push(Var::from_dimacs(value as isize).lit(!negative));
        }
    }

    fn finish_comment(&mut self) {
        // Generated test instances record their expected status as a comment (see the
        // test-instance format in the repository docs). The solver itself ignores this.
        match String::from_utf8_lossy(&self.line_buf).trim() {
            "SATISFIABLE" => self.expected_status = Some(true),
            "UNSATISFIABLE" => self.expected_status = Some(false),
            _ => (),
        }
        self.line_buf.clear();
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.line_buf).into_owned();

        let mut fields = header_line.split_whitespace();

        let valid_shape = fields.next() == Some("p") && fields.next() == Some("cnf");

        let counts: Option<(usize, usize)> = match (
            valid_shape,
            fields.next().map(str::parse),
            fields.next().map(str::parse),
            fields.next(),
        ) {
            (true, Some(Ok(var_count)), Some(Ok(clause_count)), None) => {
                Some((var_count, clause_count))
            }
            _ => None,
        };

        let (var_count, clause_count) = match counts {
            Some(counts) => counts,
            None => {
                return Err(ParserError::InvalidHeader {
                    line: self.line_number,
                    header: header_line,
                })
            }
        };

        if var_count > Var::max_count() {
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
            });
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    /// Returns the subformula of everything parsed since the last call to this method.
    ///
    /// To parse the whole input into a single [`CnfFormula`], call this once after
    /// [`eof`](DimacsParser::eof). For incremental parsing this can be invoked after each call of
    /// [`parse_chunk`](DimacsParser::parse_chunk).
    ///
    /// The variable count of the returned formula is the maximum of the variable count so far and
    /// the header count if a header is present.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    /// The DIMACS CNF header if one was present.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// The expected satisfiability recorded in a `c SATISFIABLE` or `c UNSATISFIABLE` comment.
    pub fn expected_status(&self) -> Option<bool> {
        self.expected_status
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Can be used with [`write_dimacs_header`] to implement incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
///
/// Use [`write_dimacs_header`] and [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}
