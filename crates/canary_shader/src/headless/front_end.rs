//! A small GLSL reader for the headless context.
//!
//! It does not generate code. It understands enough of the language to
//! reject broken sources the way a driver would (unbalanced brackets,
//! `#error`, unknown types, bad array sizes, statements missing their ';'
//! or running two operands together), to record the global interface
//! of a stage (structs, uniforms, inputs, outputs, `main`), and to match
//! stages against each other at link time.

use std::collections::HashMap;

use crate::backend::{ShaderKind, UniformValue};

const QUALIFIERS: &[&str] = &[
    "uniform", "in", "out", "attribute", "varying", "const", "flat", "smooth", "noperspective",
    "centroid", "highp", "mediump", "lowp", "invariant",
];

const PRECISIONS: &[&str] = &["highp", "mediump", "lowp", "invariant", "precise"];

const OPAQUE_TYPES: &[&str] = &[
    "uint", "ivec2", "ivec3", "ivec4", "uvec2", "uvec3", "uvec4", "bvec2", "bvec3", "bvec4",
    "mat2x3", "mat2x4", "mat3x2", "mat3x4", "mat4x2", "mat4x3",
];

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum GlslType {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler(String),
    /// Valid GLSL, but not settable through the typed setters.
    Opaque(String),
    Struct(String),
}

impl GlslType {
    fn resolve(name: &str, structs: &HashMap<String, Vec<Field>>) -> Option<Self> {
        let ty = match name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "float" => Self::Float,
            "vec2" => Self::Vec2,
            "vec3" => Self::Vec3,
            "vec4" => Self::Vec4,
            "mat2" => Self::Mat2,
            "mat3" => Self::Mat3,
            "mat4" => Self::Mat4,
            _ if name.starts_with("sampler") || name.starts_with("isampler") || name.starts_with("usampler") => {
                Self::Sampler(name.to_owned())
            }
            _ if OPAQUE_TYPES.contains(&name) => Self::Opaque(name.to_owned()),
            _ if structs.contains_key(name) => Self::Struct(name.to_owned()),
            _ => return None,
        };
        Some(ty)
    }

    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::Sampler(name) | Self::Opaque(name) | Self::Struct(name) => name,
        }
    }

    /// What a freshly linked program holds in a slot of this type.
    pub(crate) fn zero(&self) -> UniformValue {
        match self {
            Self::Float => UniformValue::Float(0.0),
            Self::Vec2 => UniformValue::Vec2([0.0; 2]),
            Self::Vec3 => UniformValue::Vec3([0.0; 3]),
            Self::Vec4 => UniformValue::Vec4([0.0; 4]),
            Self::Mat2 => UniformValue::Mat2([0.0; 4]),
            Self::Mat3 => UniformValue::Mat3([0.0; 9]),
            Self::Mat4 => UniformValue::Mat4([0.0; 16]),
            _ => UniformValue::Int(0),
        }
    }

    /// Whether an upload of `value` is legal for a slot of this type.
    /// Booleans and samplers are set through the integer entry point.
    pub(crate) fn accepts(&self, value: &UniformValue) -> bool {
        matches!(
            (self, value),
            (Self::Bool | Self::Int | Self::Sampler(_), UniformValue::Int(_))
                | (Self::Float, UniformValue::Float(_))
                | (Self::Vec2, UniformValue::Vec2(_))
                | (Self::Vec3, UniformValue::Vec3(_))
                | (Self::Vec4, UniformValue::Vec4(_))
                | (Self::Mat2, UniformValue::Mat2(_))
                | (Self::Mat3, UniformValue::Mat3(_))
                | (Self::Mat4, UniformValue::Mat4(_))
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Field {
    pub name: String,
    pub ty: GlslType,
    pub array: Option<usize>,
}

/// The global interface of one successfully compiled stage.
#[derive(Clone, Debug, Default)]
pub(crate) struct StageInterface {
    pub structs: HashMap<String, Vec<Field>>,
    pub uniforms: Vec<Field>,
    pub inputs: Vec<Field>,
    pub outputs: Vec<Field>,
    pub has_main: bool,
    identifier_counts: HashMap<String, usize>,
}

impl StageInterface {
    /// A name is read by the stage when it appears anywhere beyond its own
    /// declarations.
    fn reads(&self, name: &str) -> bool {
        let seen = self.identifier_counts.get(name).copied().unwrap_or(0);
        let declared = self
            .uniforms
            .iter()
            .chain(&self.inputs)
            .chain(&self.outputs)
            .filter(|field| field.name == name)
            .count();
        seen > declared
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Punct(char),
}

#[derive(Clone, Debug)]
struct Spanned {
    token: Token,
    line: usize,
}

impl Spanned {
    fn is_punct(&self, c: char) -> bool {
        self.token == Token::Punct(c)
    }

    /// Any punctuation an operand may follow, so everything but ')' and ']'.
    fn is_operator(&self) -> bool {
        matches!(self.token, Token::Punct(c) if !matches!(c, ')' | ']'))
    }

    fn ident(&self) -> Option<&str> {
        match &self.token {
            Token::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Token class as a driver names it in syntax errors.
fn describe(spanned: &Spanned) -> String {
    match &spanned.token {
        Token::Ident(name) => format!("IDENTIFIER '{name}'"),
        Token::Number(n) => format!("constant '{n}'"),
        Token::Punct(c) => format!("'{c}'"),
    }
}

fn error(line: usize, message: impl std::fmt::Display) -> String {
    format!("0:{line}: error: {message}")
}

/// Compiles one stage. `Err` carries the info log.
pub(crate) fn compile(kind: ShaderKind, source: &str) -> Result<StageInterface, String> {
    let mut errors = Vec::new();
    let mut defines = HashMap::new();
    let tokens = tokenize(source, &mut defines, &mut errors);

    if tokens.is_empty() && errors.is_empty() {
        errors.push(error(1, "syntax error, unexpected end of file"));
    }
    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    check_balance(&tokens, &mut errors);
    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    let mut parser = Parser {
        kind,
        tokens: &tokens,
        pos: 0,
        defines,
        interface: StageInterface::default(),
        errors: Vec::new(),
    };
    parser.parse();

    if !parser.errors.is_empty() {
        return Err(parser.errors.join("\n"));
    }

    let mut interface = parser.interface;
    for spanned in &tokens {
        if let Token::Ident(name) = &spanned.token {
            *interface.identifier_counts.entry(name.clone()).or_default() += 1;
        }
    }
    Ok(interface)
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut last = '\0';
                for next in chars.by_ref() {
                    // Keep line numbers stable across block comments
                    if next == '\n' {
                        out.push('\n');
                    }
                    if last == '*' && next == '/' {
                        break;
                    }
                    last = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn tokenize(source: &str, defines: &mut HashMap<String, String>, errors: &mut Vec<String>) -> Vec<Spanned> {
    let mut tokens = Vec::new();

    for (index, raw_line) in strip_comments(source).lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();

        if let Some(directive) = trimmed.strip_prefix('#') {
            let directive = directive.trim_start();
            if let Some(message) = directive.strip_prefix("error") {
                errors.push(error(line, format!("#error {}", message.trim())));
            } else if let Some(rest) = directive.strip_prefix("define") {
                let mut parts = rest.split_whitespace();
                if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                    defines.insert(name.to_owned(), value.to_owned());
                }
            }
            continue;
        }

        let chars: Vec<char> = trimmed.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let starts_number = c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit));
            if c.is_whitespace() {
                i += 1;
            } else if c.is_ascii_alphabetic() || c == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident = chars[start..i].iter().collect();
                tokens.push(Spanned { token: Token::Ident(ident), line });
            } else if starts_number {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                    i += 1;
                }
                let number = chars[start..i].iter().collect();
                tokens.push(Spanned { token: Token::Number(number), line });
            } else {
                tokens.push(Spanned { token: Token::Punct(c), line });
                i += 1;
            }
        }
    }

    tokens
}

fn check_balance(tokens: &[Spanned], errors: &mut Vec<String>) {
    let mut open: Vec<(char, usize)> = Vec::new();

    for spanned in tokens {
        let Token::Punct(c) = spanned.token else { continue };
        match c {
            '{' | '(' | '[' => open.push((c, spanned.line)),
            '}' | ')' | ']' => {
                let expected = match c {
                    '}' => '{',
                    ')' => '(',
                    _ => '[',
                };
                match open.pop() {
                    Some((o, _)) if o == expected => {}
                    _ => {
                        errors.push(error(spanned.line, format!("syntax error, unexpected '{c}'")));
                        return;
                    }
                }
            }
            _ => {}
        }
    }

    if let Some((c, line)) = open.pop() {
        errors.push(error(line, format!("syntax error, unclosed '{c}'")));
    }
}

#[derive(Clone, Copy)]
enum Storage {
    Global,
    Uniform,
    In,
    Out,
}

struct Parser<'a> {
    kind: ShaderKind,
    tokens: &'a [Spanned],
    pos: usize,
    defines: HashMap<String, String>,
    interface: StageInterface,
    errors: Vec<String>,
}

impl Parser<'_> {
    fn parse(&mut self) {
        while self.pos < self.tokens.len() {
            let line = self.tokens[self.pos].line;

            if self.tokens[self.pos].ident() == Some("struct") {
                self.parse_struct();
                continue;
            }

            // A global statement ends at ';' or opens a body with '{'
            let start = self.pos;
            let mut depth = 0usize;
            let mut end = None;
            for (offset, spanned) in self.tokens[start..].iter().enumerate() {
                match spanned.token {
                    Token::Punct('(') => depth += 1,
                    Token::Punct(')') => depth = depth.saturating_sub(1),
                    Token::Punct(';') | Token::Punct('{') if depth == 0 => {
                        end = Some(start + offset);
                        break;
                    }
                    _ => {}
                }
            }

            let Some(end) = end else {
                self.errors.push(error(line, "syntax error, unexpected end of file"));
                return;
            };

            let tokens = self.tokens;
            let statement = &tokens[start..end];
            if tokens[end].is_punct('{') {
                self.pos = self.skip_block(end);
                // A function definition ends its header with the parameter list
                let paren = statement
                    .last()
                    .filter(|t| t.is_punct(')'))
                    .and_then(|_| statement.iter().rposition(|t| t.is_punct('(')));
                if let Some(paren) = paren {
                    if !self.function_header(&statement[..paren], line) {
                        return;
                    }
                    if statement[paren - 1].ident() == Some("main") {
                        self.interface.has_main = true;
                    }
                    self.check_body(&tokens[end + 1..self.pos]);
                    if !self.errors.is_empty() {
                        return;
                    }
                } else {
                    // Interface block: the instance name, if any, runs up to ';'
                    while self.pos < self.tokens.len() && !self.tokens[self.pos].is_punct(';') {
                        self.pos += 1;
                    }
                    self.pos += 1;
                }
            } else {
                self.declaration(statement);
                self.pos = end + 1;
            }
        }
    }

    /// `[precision] type name` in front of a parameter list. Anything longer
    /// is a global declaration that lost its ';'.
    fn function_header(&mut self, header: &[Spanned], line: usize) -> bool {
        let words: Vec<&Spanned> = header
            .iter()
            .skip_while(|t| t.ident().is_some_and(|w| PRECISIONS.contains(&w)))
            .collect();

        let unexpected = match words.iter().find(|t| t.ident().is_none()) {
            Some(stray) => Some(*stray),
            None if words.len() > 2 => Some(words[words.len() - 2]),
            None => None,
        };
        if let Some(unexpected) = unexpected {
            let message = format!("syntax error, unexpected {}, expecting ',' or ';'", describe(unexpected));
            self.errors.push(error(unexpected.line, message));
            return false;
        }
        if words.len() < 2 {
            self.errors.push(error(line, "syntax error, function definition needs a return type and a name"));
            return false;
        }
        true
    }

    /// Statement-level checks on a function body, closing '}' included:
    /// every simple statement ends with ';', no two operands sit next to each
    /// other, and a local declaration names a known type.
    fn check_body(&mut self, body: &[Spanned]) {
        // One entry per open '(', true when it holds an if/for/while/switch header
        let mut parens: Vec<bool> = Vec::new();
        let mut header_next = false;
        // Depth of `= { ... }` initializer lists
        let mut initializer = 0usize;
        let mut prev: Option<&Spanned> = None;
        let mut first: Option<&Spanned> = None;
        let mut length = 0usize;

        for spanned in body {
            match &spanned.token {
                Token::Punct('(') => {
                    parens.push(std::mem::take(&mut header_next));
                }
                Token::Punct(')') => {
                    let closes_header = parens.pop().unwrap_or(false);
                    if closes_header && parens.is_empty() {
                        // `if (...)` is followed by a fresh statement
                        (prev, first, length) = (None, None, 0);
                        continue;
                    }
                }
                Token::Punct(';') => {
                    (prev, first, length) = (None, None, 0);
                    continue;
                }
                Token::Punct('{') => {
                    if initializer > 0 || prev.is_some_and(|p| p.is_punct('=')) {
                        initializer += 1;
                    } else if length > 0 {
                        self.errors.push(error(spanned.line, "syntax error, unexpected '{', expecting ',' or ';'"));
                        return;
                    } else {
                        continue;
                    }
                }
                Token::Punct('}') => {
                    if initializer > 0 {
                        initializer -= 1;
                    } else if length > 0 {
                        self.errors.push(error(spanned.line, "syntax error, unexpected '}', expecting ',' or ';'"));
                        return;
                    } else {
                        continue;
                    }
                }
                Token::Punct(':') if first.and_then(Spanned::ident).is_some_and(|w| w == "case" || w == "default") => {
                    (prev, first, length) = (None, None, 0);
                    continue;
                }
                Token::Punct(_) => {}
                Token::Ident(word) if word == "else" || word == "do" => {
                    (prev, first, length) = (None, None, 0);
                    continue;
                }
                Token::Ident(_) | Token::Number(_) => {
                    if let Some(before) = prev.filter(|p| !p.is_operator()) {
                        if !self.may_precede_operand(before, first) {
                            let message = match (length, before.ident(), spanned.ident()) {
                                (1, Some(unknown), Some(_)) => format!("unknown type '{unknown}'"),
                                _ => format!("syntax error, unexpected {}, expecting ',' or ';'", describe(spanned)),
                            };
                            self.errors.push(error(spanned.line, message));
                            return;
                        }
                    }
                    header_next = matches!(spanned.ident(), Some("if" | "for" | "while" | "switch"));
                }
            }

            if first.is_none() {
                first = Some(spanned);
            }
            prev = Some(spanned);
            length += 1;
        }
    }

    /// Whether an identifier or number may directly follow `before`.
    fn may_precede_operand(&self, before: &Spanned, first: Option<&Spanned>) -> bool {
        match &before.token {
            Token::Ident(word) => {
                self.is_type(word) || QUALIFIERS.contains(&word.as_str()) || matches!(word.as_str(), "return" | "case")
            }
            // `float[3] weights`
            Token::Punct(']') => first.and_then(Spanned::ident).is_some_and(|w| self.is_type(w)),
            _ => false,
        }
    }

    fn is_type(&self, name: &str) -> bool {
        name == "void" || GlslType::resolve(name, &self.interface.structs).is_some()
    }

    /// Returns the index just past the '}' matching the '{' at `open`.
    fn skip_block(&self, open: usize) -> usize {
        let mut depth = 0usize;
        for (index, spanned) in self.tokens.iter().enumerate().skip(open) {
            match spanned.token {
                Token::Punct('{') => depth += 1,
                Token::Punct('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return index + 1;
                    }
                }
                _ => {}
            }
        }
        self.tokens.len()
    }

    fn parse_struct(&mut self) {
        let line = self.tokens[self.pos].line;
        self.pos += 1;

        let Some(name) = self.tokens.get(self.pos).and_then(Spanned::ident).map(str::to_owned) else {
            self.errors.push(error(line, "syntax error, expected struct name"));
            self.pos = self.tokens.len();
            return;
        };
        self.pos += 1;

        if !self.tokens.get(self.pos).is_some_and(|t| t.is_punct('{')) {
            self.errors.push(error(line, format!("syntax error, expected '{{' after struct {name}")));
            self.pos = self.tokens.len();
            return;
        }
        let tokens = self.tokens;
        let close = self.skip_block(self.pos) - 1;
        let body = &tokens[self.pos + 1..close];

        let mut fields = Vec::new();
        for member in body.split(|t| t.is_punct(';')).filter(|m| !m.is_empty()) {
            if let Some(parsed) = self.declarators(member) {
                fields.extend(parsed);
            }
        }

        self.interface.structs.insert(name, fields);

        // Instances declared with the struct (`struct S { ... } s;`) are skipped
        self.pos = close + 1;
        while self.pos < self.tokens.len() && !self.tokens[self.pos].is_punct(';') {
            self.pos += 1;
        }
        self.pos += 1;
    }

    fn declaration(&mut self, statement: &[Spanned]) {
        let Some(first) = statement.first() else { return };
        if first.ident() == Some("precision") {
            return;
        }

        let mut rest = statement;
        if first.ident() == Some("layout") && rest.get(1).is_some_and(|t| t.is_punct('(')) {
            let close = rest.iter().position(|t| t.is_punct(')')).unwrap_or(rest.len() - 1);
            rest = &rest[close + 1..];
        }

        let mut storage = Storage::Global;
        let mut is_const = false;
        while let Some(word) = rest.first().and_then(Spanned::ident) {
            if !QUALIFIERS.contains(&word) {
                break;
            }
            storage = match (word, self.kind) {
                ("uniform", _) => Storage::Uniform,
                ("in", _) | ("attribute", _) => Storage::In,
                ("varying", ShaderKind::Vertex) | ("out", _) => Storage::Out,
                ("varying", ShaderKind::Fragment) => Storage::In,
                _ => storage,
            };
            is_const |= word == "const";
            rest = &rest[1..];
        }

        // Function prototype: `type name(...)`
        if rest.get(2).is_some_and(|t| t.is_punct('(')) {
            return;
        }

        let Some(fields) = self.declarators(rest) else { return };

        if is_const {
            self.record_constants(rest, &fields);
        }

        let target = match storage {
            Storage::Global => return,
            Storage::Uniform => &mut self.interface.uniforms,
            Storage::In => &mut self.interface.inputs,
            Storage::Out => &mut self.interface.outputs,
        };
        target.extend(fields);
    }

    /// Parses `type a, b[N], c = init` into fields.
    fn declarators(&mut self, tokens: &[Spanned]) -> Option<Vec<Field>> {
        let first = tokens.first()?;
        let Some(type_name) = first.ident() else {
            self.errors.push(error(first.line, "syntax error, expected a type"));
            return None;
        };
        let Some(ty) = GlslType::resolve(type_name, &self.interface.structs) else {
            self.errors.push(error(first.line, format!("unknown type '{type_name}'")));
            return None;
        };

        let mut fields = Vec::new();
        let mut i = 1;
        while i < tokens.len() {
            let Some(name) = tokens[i].ident() else {
                self.errors.push(error(tokens[i].line, "syntax error, expected an identifier"));
                return None;
            };
            let line = tokens[i].line;
            i += 1;

            let mut array = None;
            if tokens.get(i).is_some_and(|t| t.is_punct('[')) {
                let size = tokens.get(i + 1).and_then(|t| self.constant(t));
                if size.is_none() || !tokens.get(i + 2).is_some_and(|t| t.is_punct(']')) {
                    self.errors.push(error(line, "array size must be a constant integer expression"));
                    return None;
                }
                array = size;
                i += 3;
            }

            // Skip an initializer up to the next top-level ','
            if tokens.get(i).is_some_and(|t| t.is_punct('=')) {
                let mut depth = 0usize;
                while i < tokens.len() {
                    match tokens[i].token {
                        Token::Punct('(') => depth += 1,
                        Token::Punct(')') => depth = depth.saturating_sub(1),
                        Token::Punct(',') if depth == 0 => break,
                        _ => {}
                    }
                    i += 1;
                }
            }

            fields.push(Field {
                name: name.to_owned(),
                ty: ty.clone(),
                array,
            });

            match tokens.get(i) {
                None => break,
                Some(t) if t.is_punct(',') => i += 1,
                Some(t) => {
                    self.errors.push(error(t.line, "syntax error, expected ',' or ';'"));
                    return None;
                }
            }
        }

        if fields.is_empty() {
            self.errors.push(error(first.line, "syntax error, declaration without a name"));
            return None;
        }
        Some(fields)
    }

    /// `const int N = 4;` can size later arrays, like `#define N 4`.
    fn record_constants(&mut self, tokens: &[Spanned], fields: &[Field]) {
        for field in fields.iter().filter(|f| f.ty == GlslType::Int) {
            let value = tokens
                .windows(3)
                .find(|w| w[0].ident() == Some(field.name.as_str()) && w[1].is_punct('='))
                .and_then(|w| match &w[2].token {
                    Token::Number(n) => Some(n.clone()),
                    _ => None,
                });
            if let Some(value) = value {
                self.defines.insert(field.name.clone(), value);
            }
        }
    }

    fn constant(&self, spanned: &Spanned) -> Option<usize> {
        let text = match &spanned.token {
            Token::Number(n) => n.as_str(),
            Token::Ident(name) => self.defines.get(name)?.as_str(),
            Token::Punct(_) => return None,
        };
        text.trim_end_matches(['u', 'U']).parse().ok().filter(|&n| n > 0)
    }
}

/// Links a vertex and a fragment stage. On success returns the active
/// uniforms, flattened to the names the API resolves
/// (`lights[0].Intensity`, `weights[2]`, ...), in declaration order.
pub(crate) fn link(vertex: &StageInterface, fragment: &StageInterface) -> Result<Vec<(String, GlslType)>, String> {
    let mut errors = Vec::new();

    if !vertex.has_main {
        errors.push("error: vertex shader lacks `main'".to_owned());
    }
    if !fragment.has_main {
        errors.push("error: fragment shader lacks `main'".to_owned());
    }

    for input in &fragment.inputs {
        match vertex.outputs.iter().find(|output| output.name == input.name) {
            None => errors.push(format!(
                "error: fragment shader input `{}' has no matching output in the previous stage",
                input.name
            )),
            Some(output) if output.ty != input.ty || output.array != input.array => errors.push(format!(
                "error: vertex shader output `{}' declared as type `{}', but fragment shader input declared as type `{}'",
                input.name,
                output.ty.name(),
                input.ty.name()
            )),
            Some(_) => {}
        }
    }

    let mut declared: Vec<&Field> = Vec::new();
    for uniform in vertex.uniforms.iter().chain(&fragment.uniforms) {
        match declared.iter().find(|d| d.name == uniform.name) {
            Some(existing) if existing.ty != uniform.ty || existing.array != uniform.array => {
                errors.push(format!(
                    "error: uniform `{}' declared as type `{}' and type `{}'",
                    uniform.name,
                    existing.ty.name(),
                    uniform.ty.name()
                ));
            }
            Some(_) => {}
            None => declared.push(uniform),
        }
    }

    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    let mut structs = vertex.structs.clone();
    for (name, fields) in &fragment.structs {
        structs.entry(name.clone()).or_insert_with(|| fields.clone());
    }

    let mut active = Vec::new();
    for uniform in declared {
        if vertex.reads(&uniform.name) || fragment.reads(&uniform.name) {
            flatten(&uniform.name, &uniform.ty, uniform.array, &structs, &mut active);
        }
    }
    Ok(active)
}

fn flatten(
    name: &str,
    ty: &GlslType,
    array: Option<usize>,
    structs: &HashMap<String, Vec<Field>>,
    out: &mut Vec<(String, GlslType)>,
) {
    match array {
        Some(len) => {
            for i in 0..len {
                flatten(&format!("{name}[{i}]"), ty, None, structs, out);
            }
        }
        None => match ty {
            GlslType::Struct(struct_name) => {
                for field in structs.get(struct_name).into_iter().flatten() {
                    flatten(&format!("{name}.{}", field.name), &field.ty, field.array, structs, out);
                }
            }
            _ => out.push((name.to_owned(), ty.clone())),
        },
    }
}
