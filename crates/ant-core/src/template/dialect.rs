//! `<<` / `>>` 区切りのテンプレートを Tera のテンプレートに変換する。
//!
//! テンプレートリポジトリの Ansible ファイルは Jinja の `{{ }}` / `{% %}` を
//! そのまま含むため、アクション外のテキストは Tera に解釈されないよう
//! エスケープして出力する。

use crate::domain::error::TemplateError;

pub const LEFT_DELIM: &str = "<<";
pub const RIGHT_DELIM: &str = ">>";

/// 値を出力するアクションに付けるフィルタ名。登録は [`super::RoleRenderer`] が行う。
pub const PRINT_FILTER: &str = "ant_print";

/// Tera の文字列リテラルとして `{` を出力するタグ。
const ESCAPED_BRACE: &str = r#"{{ "{" }}"#;

#[derive(Debug)]
enum Block {
    Range { dot: String },
    If { has_else: bool },
    /// `with` の本体では `.` が対象の値になる。`else` 以降は元に戻る。
    With { dot: String, has_else: bool, in_alt: bool },
}

/// 開いているブロックと、その時点の変数の数。
#[derive(Debug)]
struct Frame {
    block: Block,
    vars_len: usize,
}

#[derive(Default)]
struct Translator {
    out: String,
    frames: Vec<Frame>,
    /// 宣言済みの変数 (`$x`) と、対応する Tera 側の名前
    vars: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Str(String),
    LParen,
    RParen,
    Comma,
    Declare,
    Pipe,
}

/// 比較演算子。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn negated(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Ne,
            CompareOp::Ne => CompareOp::Eq,
            CompareOp::Lt => CompareOp::Ge,
            CompareOp::Le => CompareOp::Gt,
            CompareOp::Gt => CompareOp::Le,
            CompareOp::Ge => CompareOp::Lt,
        }
    }
}

/// 変換途中の式。
///
/// Tera は `not` の直後に括弧付きの比較を書けないため、否定は
/// 比較演算子の反転とド・モルガンの法則で値の直前まで押し下げておく。
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    /// フィールド・変数・リテラル
    Value(String),
    /// `len x`
    Length(String),
    Compare {
        left: Box<Node>,
        op: CompareOp,
        right: Box<Node>,
    },
    All(Vec<Node>),
    Any(Vec<Node>),
    /// `Value` か `Length` の否定のみ
    Not(Box<Node>),
}

impl Node {
    fn negated(self) -> Node {
        match self {
            Node::Value(_) | Node::Length(_) => Node::Not(Box::new(self)),
            Node::Compare { left, op, right } => Node::Compare {
                left,
                op: op.negated(),
                right,
            },
            Node::All(items) => Node::Any(items.into_iter().map(Node::negated).collect()),
            Node::Any(items) => Node::All(items.into_iter().map(Node::negated).collect()),
            Node::Not(inner) => *inner,
        }
    }

    /// 比較の左右に置けるか。
    fn is_scalar(&self) -> bool {
        matches!(self, Node::Value(_) | Node::Length(_))
    }

    fn render(&self) -> String {
        match self {
            Node::Value(text) => text.clone(),
            Node::Length(text) => format!("{text} | length"),
            Node::Compare { left, op, right } => {
                format!("{} {} {}", left.render(), op.symbol(), right.render())
            }
            Node::All(items) => Self::join(items, " and "),
            Node::Any(items) => Self::join(items, " or "),
            Node::Not(inner) => format!("not {}", inner.render()),
        }
    }

    fn join(items: &[Node], separator: &str) -> String {
        items
            .iter()
            .map(|item| match item {
                Node::All(_) | Node::Any(_) => format!("({})", item.render()),
                _ => item.render(),
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// テンプレートを Tera の構文に変換する。
///
/// # Errors
/// アクションが閉じられていない、`end` の対応が取れない、
/// 未宣言の変数を参照している、または未対応のアクションを含む場合。
pub fn translate(source: &str) -> Result<String, TemplateError> {
    let mut translator = Translator::default();
    translator.run(source)?;
    Ok(translator.out)
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

fn parse_error(line: usize, message: impl Into<String>) -> TemplateError {
    TemplateError::Parse {
        line,
        message: message.into(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn tokenize(body: &str, line: usize) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if is_space(c) => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            ':' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err(parse_error(line, "unexpected \":\" in command"));
                }
                tokens.push(Token::Declare);
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some(escaped @ ('"' | '\\')) => value.push(escaped),
                            _ => return Err(parse_error(line, "invalid escape in quoted string")),
                        },
                        Some(other) => value.push(other),
                        None => return Err(parse_error(line, "unterminated quoted string")),
                    }
                }
                tokens.push(Token::Str(value));
            }
            '`' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(other) => value.push(other),
                        None => return Err(parse_error(line, "unterminated raw quoted string")),
                    }
                }
                tokens.push(Token::Str(value));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if is_space(c) || matches!(c, '(' | ')' | ',' | '|' | ':' | '"' | '`') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }
    Ok(tokens)
}

/// Tera の文字列リテラル。Tera にはエスケープが無いため、内容に現れない引用符を選ぶ。
fn string_literal(value: &str, line: usize) -> Result<String, TemplateError> {
    ['"', '\'', '`']
        .into_iter()
        .find(|q| !value.contains(*q))
        .map(|q| format!("{q}{value}{q}"))
        .ok_or_else(|| parse_error(line, "string literal cannot be represented"))
}

fn is_word(token: Option<&Token>, expected: &str) -> bool {
    matches!(token, Some(Token::Word(w)) if w == expected)
}

impl Translator {
    fn run(&mut self, source: &str) -> Result<(), TemplateError> {
        let mut rest = source;
        let mut trim_leading = false;

        while let Some(start) = rest.find(LEFT_DELIM) {
            let line = line_at(source, source.len() - rest.len() + start);
            let mut text = &rest[..start];
            if trim_leading {
                text = text.trim_start_matches(is_space);
            }

            let after = &rest[start + LEFT_DELIM.len()..];
            let Some(end) = after.find(RIGHT_DELIM) else {
                return Err(parse_error(line, "unclosed action"));
            };

            let mut body = &after[..end];
            if body.starts_with('-') && body[1..].starts_with(is_space) {
                text = text.trim_end_matches(is_space);
                body = &body[1..];
            }
            let trim_right = body.ends_with('-') && body[..body.len() - 1].ends_with(is_space);
            if trim_right {
                body = &body[..body.len() - 1];
            }

            self.literal(text);
            self.action(body.trim(), line)?;

            rest = &after[end + RIGHT_DELIM.len()..];
            trim_leading = trim_right;
        }

        let text = if trim_leading {
            rest.trim_start_matches(is_space)
        } else {
            rest
        };
        self.literal(text);

        let eof_line = line_at(source, source.len());
        match self.frames.last().map(|f| &f.block) {
            Some(Block::Range { .. }) => Err(parse_error(eof_line, "unexpected EOF: unclosed range")),
            Some(Block::If { .. }) => Err(parse_error(eof_line, "unexpected EOF: unclosed if")),
            Some(Block::With { .. }) => Err(parse_error(eof_line, "unexpected EOF: unclosed with")),
            None => Ok(()),
        }
    }

    fn literal(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '{' && matches!(chars.peek(), None | Some('{' | '%' | '#')) {
                self.out.push_str(ESCAPED_BRACE);
            } else {
                self.out.push(c);
            }
        }
    }

    fn open(&mut self, block: Block) {
        self.frames.push(Frame {
            block,
            vars_len: self.vars.len(),
        });
    }

    fn action(&mut self, body: &str, line: usize) -> Result<(), TemplateError> {
        if body.starts_with("/*") && body.ends_with("*/") && body.len() >= 4 {
            return Ok(());
        }

        let tokens = tokenize(body, line)?;
        let unsupported = || parse_error(line, format!("unsupported action: {body}"));

        match tokens.first() {
            None => Err(parse_error(line, "missing value for command")),
            Some(Token::Word(w)) if w == "end" => {
                if tokens.len() != 1 {
                    return Err(unsupported());
                }
                self.end(line)
            }
            Some(Token::Word(w)) if w == "else" => {
                if tokens.len() == 1 {
                    self.else_branch(line)
                } else if is_word(tokens.get(1), "if") {
                    self.else_if(&tokens[2..], body, line)
                } else {
                    Err(unsupported())
                }
            }
            Some(Token::Word(w)) if w == "range" => self.range(&tokens[1..], body, line),
            Some(Token::Word(w)) if w == "if" => {
                let expr = self.pipeline(&tokens[1..], body, line)?;
                self.out.push_str(&format!("{{% if {} %}}", expr.render()));
                self.open(Block::If { has_else: false });
                Ok(())
            }
            Some(Token::Word(w)) if w == "with" => {
                let expr = self.pipeline(&tokens[1..], body, line)?;
                let dot = format!("__with{}", self.frames.len());
                self.out.push_str(&format!(
                    "{{% if {0} %}}{{% set {dot} = {0} %}}",
                    expr.render()
                ));
                self.open(Block::With {
                    dot,
                    has_else: false,
                    in_alt: false,
                });
                Ok(())
            }
            Some(Token::Word(w)) if w.starts_with('$') && tokens.get(1) == Some(&Token::Declare) => {
                let expr = self.pipeline(&tokens[2..], body, line)?;
                let name = self.declare(w, line)?;
                self.out.push_str(&format!("{{% set {name} = {} %}}", expr.render()));
                Ok(())
            }
            Some(_) => {
                let expr = self.pipeline(&tokens, body, line)?;
                match expr {
                    Node::Value(value) => self
                        .out
                        .push_str(&format!("{{{{ {value} | {PRINT_FILTER} }}}}")),
                    other => self.out.push_str(&format!("{{{{ {} }}}}", other.render())),
                }
                Ok(())
            }
        }
    }

    fn end(&mut self, line: usize) -> Result<(), TemplateError> {
        let Some(frame) = self.frames.pop() else {
            return Err(parse_error(line, "unexpected <<end>>"));
        };
        self.vars.truncate(frame.vars_len);
        match frame.block {
            Block::Range { .. } => self.out.push_str("{% endfor %}"),
            Block::If { .. } | Block::With { .. } => self.out.push_str("{% endif %}"),
        }
        Ok(())
    }

    fn else_branch(&mut self, line: usize) -> Result<(), TemplateError> {
        match self.frames.last_mut().map(|f| &mut f.block) {
            Some(Block::If { has_else }) | Some(Block::With { has_else, .. }) if *has_else => {
                Err(parse_error(line, "multiple <<else>> in block"))
            }
            Some(Block::If { has_else }) => {
                *has_else = true;
                self.out.push_str("{% else %}");
                Ok(())
            }
            Some(Block::With {
                has_else, in_alt, ..
            }) => {
                *has_else = true;
                *in_alt = true;
                self.out.push_str("{% else %}");
                Ok(())
            }
            Some(Block::Range { .. }) => {
                Err(parse_error(line, "<<else>> inside range is not supported"))
            }
            None => Err(parse_error(line, "unexpected <<else>>")),
        }
    }

    fn else_if(&mut self, tokens: &[Token], body: &str, line: usize) -> Result<(), TemplateError> {
        match self.frames.last().map(|f| &f.block) {
            Some(Block::If { has_else: false } | Block::With { has_else: false, .. }) => {}
            Some(Block::Range { .. }) => {
                return Err(parse_error(line, "<<else>> inside range is not supported"));
            }
            Some(_) => return Err(parse_error(line, "<<else if>> after <<else>>")),
            None => return Err(parse_error(line, "unexpected <<else>>")),
        }
        if let Some(Frame {
            block: Block::With { in_alt, .. },
            ..
        }) = self.frames.last_mut()
        {
            *in_alt = true;
        }
        let expr = self.pipeline(tokens, body, line)?;
        self.out.push_str(&format!("{{% elif {} %}}", expr.render()));
        Ok(())
    }

    fn range(&mut self, tokens: &[Token], body: &str, line: usize) -> Result<(), TemplateError> {
        let (declared, dot, iterable) = match tokens {
            [Token::Word(var), Token::Declare, rest @ ..] if var.starts_with('$') => {
                let expr = self.pipeline(rest, body, line)?;
                (Some(var.clone()), self.tera_var_name(var, line)?, expr)
            }
            _ => {
                let expr = self.pipeline(tokens, body, line)?;
                (None, format!("__item{}", self.frames.len()), expr)
            }
        };
        let Node::Value(iterable) = iterable else {
            return Err(parse_error(line, format!("range can't iterate over {body}")));
        };
        self.out
            .push_str(&format!("{{% for {dot} in {iterable} %}}"));
        self.open(Block::Range { dot: dot.clone() });
        if let Some(var) = declared {
            self.vars.push((var, dot));
        }
        Ok(())
    }

    fn tera_var_name(&self, var: &str, line: usize) -> Result<String, TemplateError> {
        let name = &var[1..];
        if !is_identifier(name) {
            return Err(parse_error(line, format!("invalid variable name: {var}")));
        }
        Ok(format!("__var_{name}"))
    }

    fn declare(&mut self, var: &str, line: usize) -> Result<String, TemplateError> {
        let name = self.tera_var_name(var, line)?;
        self.vars.push((var.to_string(), name.clone()));
        Ok(name)
    }

    /// アクション全体の式。パイプラインは未対応。
    fn pipeline(&self, tokens: &[Token], body: &str, line: usize) -> Result<Node, TemplateError> {
        if tokens.is_empty() {
            return Err(parse_error(line, "missing value for command"));
        }
        if tokens.iter().any(|t| matches!(t, Token::Pipe | Token::Declare | Token::Comma)) {
            return Err(parse_error(line, format!("unsupported action: {body}")));
        }
        let mut pos = 0;
        let expr = self.command(tokens, &mut pos, body, line)?;
        if pos != tokens.len() {
            return Err(parse_error(line, format!("unsupported action: {body}")));
        }
        Ok(expr)
    }

    /// 関数呼び出し (`eq a b` など) または単一のオペランド。
    fn command(
        &self,
        tokens: &[Token],
        pos: &mut usize,
        body: &str,
        line: usize,
    ) -> Result<Node, TemplateError> {
        let function = match tokens.get(*pos) {
            Some(Token::Word(w)) if is_function(w) => w.clone(),
            _ => {
                let operand = self.argument(tokens, pos, body, line)?;
                if *pos < tokens.len() && !matches!(tokens[*pos], Token::RParen) {
                    return Err(parse_error(line, format!("unsupported action: {body}")));
                }
                return Ok(operand);
            }
        };
        *pos += 1;

        let mut args = Vec::new();
        while *pos < tokens.len() && !matches!(tokens[*pos], Token::RParen) {
            args.push(self.argument(tokens, pos, body, line)?);
        }

        let wrong_arity = |got: usize| {
            parse_error(
                line,
                format!("wrong number of args for {function}: got {got}"),
            )
        };
        let incomparable = || parse_error(line, format!("incompatible types for comparison: {body}"));
        let count = args.len();
        match function.as_str() {
            "not" => {
                let [arg] = <[Node; 1]>::try_from(args).map_err(|_| wrong_arity(count))?;
                Ok(arg.negated())
            }
            "and" if count >= 2 => Ok(Node::All(args)),
            "or" if count >= 2 => Ok(Node::Any(args)),
            "and" | "or" => Err(wrong_arity(count)),
            "eq" => {
                if count < 2 {
                    return Err(wrong_arity(count));
                }
                if !args.iter().all(Node::is_scalar) {
                    return Err(incomparable());
                }
                let mut args = args.into_iter();
                let first = args.next().ok_or_else(|| wrong_arity(count))?;
                let mut comparisons: Vec<Node> = args
                    .map(|other| Node::Compare {
                        left: Box::new(first.clone()),
                        op: CompareOp::Eq,
                        right: Box::new(other),
                    })
                    .collect();
                if comparisons.len() == 1 {
                    Ok(comparisons.remove(0))
                } else {
                    Ok(Node::Any(comparisons))
                }
            }
            "ne" | "lt" | "le" | "gt" | "ge" => {
                let [left, right] = <[Node; 2]>::try_from(args).map_err(|_| wrong_arity(count))?;
                if !left.is_scalar() || !right.is_scalar() {
                    return Err(incomparable());
                }
                let op = match function.as_str() {
                    "ne" => CompareOp::Ne,
                    "lt" => CompareOp::Lt,
                    "le" => CompareOp::Le,
                    "gt" => CompareOp::Gt,
                    _ => CompareOp::Ge,
                };
                Ok(Node::Compare {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                })
            }
            _ => match <[Node; 1]>::try_from(args).map_err(|_| wrong_arity(count))? {
                [Node::Value(value)] => Ok(Node::Length(value)),
                _ => Err(parse_error(line, format!("len of unsupported value: {body}"))),
            },
        }
    }

    fn argument(
        &self,
        tokens: &[Token],
        pos: &mut usize,
        body: &str,
        line: usize,
    ) -> Result<Node, TemplateError> {
        let unsupported = || parse_error(line, format!("unsupported action: {body}"));
        let token = tokens.get(*pos).ok_or_else(unsupported)?;
        *pos += 1;
        match token {
            Token::LParen => {
                let inner = self.command(tokens, pos, body, line)?;
                if tokens.get(*pos) != Some(&Token::RParen) {
                    return Err(parse_error(line, "unclosed left paren"));
                }
                *pos += 1;
                Ok(inner)
            }
            Token::Str(value) => Ok(Node::Value(string_literal(value, line)?)),
            Token::Word(word) => self.operand(word, body, line),
            _ => Err(unsupported()),
        }
    }

    /// 単一のオペランド (`.`, `.Field`, `field`, `$var`, `$.Field`, 数値, 真偽値) を変換する。
    fn operand(&self, word: &str, body: &str, line: usize) -> Result<Node, TemplateError> {
        if word == "." {
            return self
                .current_dot()
                .map(Node::Value)
                .ok_or_else(|| parse_error(line, "'.' is only supported inside range or with"));
        }
        if word == "true" || word == "false" || word.parse::<i64>().is_ok() {
            return Ok(Node::Value(word.to_string()));
        }
        if let Some(field) = word.strip_prefix("$.") {
            return self.field(field, body, line);
        }
        if word.starts_with('$') {
            return self
                .vars
                .iter()
                .rev()
                .find(|(name, _)| name == word)
                .map(|(_, tera)| Node::Value(tera.clone()))
                .ok_or_else(|| parse_error(line, format!("undefined variable \"{word}\"")));
        }
        if is_function(word) {
            return Err(parse_error(line, format!("unsupported action: {body}")));
        }
        self.field(word.strip_prefix('.').unwrap_or(word), body, line)
    }

    fn field(&self, field: &str, body: &str, line: usize) -> Result<Node, TemplateError> {
        if !is_identifier(field) {
            return Err(parse_error(line, format!("unsupported action: {body}")));
        }
        Ok(Node::Value(field.to_ascii_lowercase()))
    }

    fn current_dot(&self) -> Option<String> {
        self.frames.iter().rev().find_map(|f| match &f.block {
            Block::Range { dot } => Some(dot.clone()),
            Block::With {
                dot, in_alt: false, ..
            } => Some(dot.clone()),
            Block::With { .. } | Block::If { .. } => None,
        })
    }
}

fn is_function(word: &str) -> bool {
    matches!(
        word,
        "not" | "and" | "or" | "eq" | "ne" | "lt" | "le" | "gt" | "ge" | "len"
    )
}
