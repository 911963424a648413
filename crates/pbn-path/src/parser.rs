use crate::ast::{PathCmd, PathData};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenWithPos};

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser {
    tokens: Vec<TokenWithPos>,
    pos: usize,

    /// Current point, absolute.
    cur: (f32, f32),
    /// Start of the current subpath; `Z` returns here.
    start: (f32, f32),
    /// Control point of the previous quadratic, for `T` reflection.
    last_ctrl: Option<(f32, f32)>,
    /// True once a `MoveTo` has been emitted.
    started: bool,
}

impl Parser {
    pub fn new(tokens: Vec<TokenWithPos>) -> Self {
        Self {
            tokens,
            pos: 0,
            cur: (0.0, 0.0),
            start: (0.0, 0.0),
            last_ctrl: None,
            started: false,
        }
    }

    fn current_pos(&self) -> (usize, usize) {
        self.tokens
            .get(self.pos)
            .map(|t| (t.line, t.col))
            .or_else(|| self.tokens.last().map(|t| (t.line, t.col)))
            .unwrap_or((1, 1))
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|t| &t.token).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos)
            .map(|t| t.token.clone())
            .unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        let (line, col) = self.current_pos();
        ParseError::new(msg, line, col)
    }

    fn expect_number(&mut self) -> Result<f32, ParseError> {
        let err = self.err("expected a number");
        match self.advance() {
            Token::Number(n) => Ok(n),
            tok => Err(ParseError { message: format!("expected a number, got {:?}", tok), ..err }),
        }
    }

    fn expect_pair(&mut self) -> Result<(f32, f32), ParseError> {
        let x = self.expect_number()?;
        let y = self.expect_number()?;
        Ok((x, y))
    }

    fn next_is_number(&self) -> bool {
        matches!(self.peek(), Token::Number(_))
    }

    // ── Document ──────────────────────────────────────────────────────────

    pub fn parse_path(&mut self) -> Result<PathData, ParseError> {
        let mut out = Vec::new();

        loop {
            match self.advance() {
                Token::Eof => break,
                Token::Command(c) => self.parse_command(c, &mut out)?,
                Token::Number(n) => {
                    self.pos -= 1;
                    return Err(self.err(format!("expected a command letter, got number {}", n)));
                }
            }
        }

        Ok(PathData::new(out))
    }

    // ── Commands ──────────────────────────────────────────────────────────

    fn parse_command(&mut self, c: char, out: &mut Vec<PathCmd>) -> Result<(), ParseError> {
        let relative = c.is_ascii_lowercase();
        let upper = c.to_ascii_uppercase();

        if !self.started && upper != 'M' {
            self.pos -= 1;
            return Err(self.err(format!("path must start with a moveto, got {:?}", c)));
        }

        match upper {
            'M' => {
                let p = self.next_point(relative)?;
                self.cur = p;
                self.start = p;
                self.started = true;
                self.last_ctrl = None;
                out.push(PathCmd::MoveTo { x: p.0, y: p.1 });
                // Extra coordinate pairs after a moveto are implicit linetos.
                while self.next_is_number() {
                    let p = self.next_point(relative)?;
                    self.line_to(p, out);
                }
            }
            'L' => loop {
                let p = self.next_point(relative)?;
                self.line_to(p, out);
                if !self.next_is_number() { break; }
            },
            'H' => loop {
                let x = self.expect_number()?;
                let x = if relative { self.cur.0 + x } else { x };
                self.line_to((x, self.cur.1), out);
                if !self.next_is_number() { break; }
            },
            'V' => loop {
                let y = self.expect_number()?;
                let y = if relative { self.cur.1 + y } else { y };
                self.line_to((self.cur.0, y), out);
                if !self.next_is_number() { break; }
            },
            'Q' => loop {
                let ctrl = self.next_point(relative)?;
                let end = self.next_point(relative)?;
                self.quad_to(ctrl, end, out);
                if !self.next_is_number() { break; }
            },
            'T' => loop {
                // Reflect the previous control point; without one the control
                // collapses onto the current point.
                let ctrl = match self.last_ctrl {
                    Some((cx, cy)) => (2.0 * self.cur.0 - cx, 2.0 * self.cur.1 - cy),
                    None => self.cur,
                };
                let end = self.next_point(relative)?;
                self.quad_to(ctrl, end, out);
                if !self.next_is_number() { break; }
            },
            'Z' => {
                out.push(PathCmd::Close);
                self.cur = self.start;
                self.last_ctrl = None;
            }
            _ => return Err(self.err(format!("unsupported path command {:?}", c))),
        }

        Ok(())
    }

    /// Reads a coordinate pair, resolved against the current point when
    /// `relative`.
    fn next_point(&mut self, relative: bool) -> Result<(f32, f32), ParseError> {
        let (x, y) = self.expect_pair()?;
        Ok(if relative { (self.cur.0 + x, self.cur.1 + y) } else { (x, y) })
    }

    fn line_to(&mut self, p: (f32, f32), out: &mut Vec<PathCmd>) {
        self.cur = p;
        self.last_ctrl = None;
        out.push(PathCmd::LineTo { x: p.0, y: p.1 });
    }

    fn quad_to(&mut self, ctrl: (f32, f32), end: (f32, f32), out: &mut Vec<PathCmd>) {
        self.cur = end;
        self.last_ctrl = Some(ctrl);
        out.push(PathCmd::QuadTo { cx: ctrl.0, cy: ctrl.1, x: end.0, y: end.1 });
    }
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse SVG path data into absolute [`PathData`].
pub fn parse_str(src: &str) -> Result<PathData, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_path()
}
