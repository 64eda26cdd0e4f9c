use crate::ast::{BinaryOp, Node, SourceFile, VarKeyword};
use crate::error::CoreError;
use crate::lexer::{Token, TokenKind, lex};
use crate::types::Ty;

/// Parse one source file into its syntax tree.
pub fn parse(path: &str, source: &str) -> Result<SourceFile, CoreError> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        source,
        tokens,
        position: 0,
    };
    let mut statements = Vec::new();
    while !parser.at(TokenKind::Eof) {
        statements.push(parser.parse_statement(true)?);
    }
    Ok(SourceFile {
        path: path.to_string(),
        statements,
    })
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> TokenKind {
        self.tokens
            .get(self.position)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.position];
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, CoreError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(CoreError::ParseError(format!(
                "expected {what} but found {:?}",
                self.peek()
            )))
        }
    }

    fn text(&self, token: Token) -> &'src str {
        &self.source[token.text_start as usize..token.text_end as usize]
    }

    fn parse_statement(&mut self, top_level: bool) -> Result<Node, CoreError> {
        let mut decorators = Vec::new();
        while self.at(TokenKind::At) {
            self.bump();
            let name = self.expect(TokenKind::Ident, "decorator name")?;
            decorators.push(Node::Ident(self.text(name).to_string()));
        }

        let exported = if self.at(TokenKind::Export) {
            if !top_level {
                return Err(CoreError::ParseError(
                    "'export' is only allowed at the top level".to_string(),
                ));
            }
            self.bump();
            true
        } else {
            false
        };

        match self.peek() {
            TokenKind::Const | TokenKind::Let => {
                if !decorators.is_empty() {
                    return Err(CoreError::ParseError(
                        "decorators are only allowed on function declarations".to_string(),
                    ));
                }
                self.parse_var_decl(exported)
            }
            TokenKind::Function => {
                if !top_level {
                    return Err(CoreError::ParseError(
                        "nested function declarations are not supported".to_string(),
                    ));
                }
                self.parse_fn_decl(exported, decorators)
            }
            TokenKind::Return if !top_level => {
                if exported || !decorators.is_empty() {
                    return Err(CoreError::ParseError(
                        "'return' cannot be exported or decorated".to_string(),
                    ));
                }
                self.parse_return()
            }
            other => Err(CoreError::ParseError(format!(
                "unexpected {other:?} at start of statement"
            ))),
        }
    }

    fn parse_var_decl(&mut self, exported: bool) -> Result<Node, CoreError> {
        let keyword = match self.bump().kind {
            TokenKind::Const => VarKeyword::Const,
            _ => VarKeyword::Let,
        };
        let name = self.expect(TokenKind::Ident, "declaration name")?;
        let ty = self.parse_annotation()?;
        self.expect(TokenKind::Equal, "'='")?;
        let init = self.parse_expr()?;
        self.expect(TokenKind::Semi, "';' after declaration")?;
        Ok(Node::VarDecl {
            exported,
            keyword,
            name: Box::new(Node::Ident(self.text(name).to_string())),
            ty,
            init: Box::new(init),
        })
    }

    fn parse_fn_decl(&mut self, exported: bool, decorators: Vec<Node>) -> Result<Node, CoreError> {
        self.bump(); // 'function'
        let name = self.expect(TokenKind::Ident, "function name")?;
        self.expect(TokenKind::LParen, "'('")?;

        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) {
            if !params.is_empty() {
                self.expect(TokenKind::Comma, "',' between parameters")?;
            }
            let param_name = self.expect(TokenKind::Ident, "parameter name")?;
            let param_ty = self.parse_annotation()?;
            params.push(Node::Param {
                name: Box::new(Node::Ident(self.text(param_name).to_string())),
                ty: param_ty,
            });
        }
        self.expect(TokenKind::RParen, "')'")?;

        let ret = self.parse_annotation()?;

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut body = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(CoreError::ParseError(
                    "unterminated function body".to_string(),
                ));
            }
            body.push(self.parse_statement(false)?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(Node::FnDecl {
            exported,
            decorators,
            name: Box::new(Node::Ident(self.text(name).to_string())),
            params,
            ret,
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Node, CoreError> {
        self.bump(); // 'return'
        let value = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        self.expect(TokenKind::Semi, "';' after return")?;
        Ok(Node::Return(value))
    }

    /// Optional `: type` annotation. Unknown type names resolve to `any`.
    fn parse_annotation(&mut self) -> Result<Option<Ty>, CoreError> {
        if !self.at(TokenKind::Colon) {
            return Ok(None);
        }
        self.bump();
        let name = self.expect(TokenKind::Ident, "type name")?;
        Ok(Some(Ty::from_annotation(self.text(name))))
    }

    fn parse_expr(&mut self) -> Result<Node, CoreError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Node, CoreError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = Node::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Node, CoreError> {
        let mut lhs = self.parse_primary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_primary()?;
            lhs = Node::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Node, CoreError> {
        match self.peek() {
            TokenKind::NumberLiteral => {
                let token = self.bump();
                let text = self.text(token);
                let value = text.parse::<f64>().map_err(|_| {
                    CoreError::ParseError(format!("invalid number literal '{text}'"))
                })?;
                Ok(Node::Number(value))
            }
            TokenKind::StringLiteral => {
                let token = self.bump();
                Ok(Node::Str(unescape(self.text(token))))
            }
            TokenKind::BoolLiteral => {
                let token = self.bump();
                Ok(Node::Bool(self.text(token) == "true"))
            }
            TokenKind::Ident => {
                let token = self.bump();
                let ident = Node::Ident(self.text(token).to_string());
                if self.at(TokenKind::LParen) {
                    self.bump();
                    let mut args = Vec::new();
                    while !self.at(TokenKind::RParen) {
                        if !args.is_empty() {
                            self.expect(TokenKind::Comma, "',' between arguments")?;
                        }
                        args.push(self.parse_expr()?);
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    Ok(Node::Call {
                        callee: Box::new(ident),
                        args,
                    })
                } else {
                    Ok(ident)
                }
            }
            TokenKind::LParen => {
                self.bump();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            other => Err(CoreError::ParseError(format!(
                "unexpected {other:?} in expression"
            ))),
        }
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exported_const() {
        let unit = parse("/file.tys", "export const value = 42;").expect("parse");
        assert_eq!(unit.path, "/file.tys");
        assert_eq!(unit.statements.len(), 1);
        match &unit.statements[0] {
            Node::VarDecl {
                exported,
                keyword,
                name,
                ty,
                init,
            } => {
                assert!(*exported);
                assert_eq!(*keyword, VarKeyword::Const);
                assert_eq!(name.ident_text(), "value");
                assert!(ty.is_none());
                assert_eq!(**init, Node::Number(42.0));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_annotation_and_precedence() {
        let unit = parse("/m.tys", "const x: number = 1 + 2 * 3;").expect("parse");
        match &unit.statements[0] {
            Node::VarDecl { ty, init, .. } => {
                assert_eq!(*ty, Some(Ty::Number));
                match &**init {
                    Node::Binary { op, rhs, .. } => {
                        assert_eq!(*op, BinaryOp::Add);
                        assert!(matches!(
                            &**rhs,
                            Node::Binary {
                                op: BinaryOp::Mul,
                                ..
                            }
                        ));
                    }
                    other => panic!("unexpected init: {other:?}"),
                }
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_function_with_params_and_return() {
        let source = "export function add(a: number, b: number): number { return a + b; }";
        let unit = parse("/m.tys", source).expect("parse");
        match &unit.statements[0] {
            Node::FnDecl {
                exported,
                name,
                params,
                ret,
                body,
                ..
            } => {
                assert!(*exported);
                assert_eq!(name.ident_text(), "add");
                assert_eq!(params.len(), 2);
                assert_eq!(*ret, Some(Ty::Number));
                assert!(matches!(body[0], Node::Return(Some(_))));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_decorated_function() {
        let unit = parse("/m.tys", "@traced function f() { return 1; }").expect("parse");
        match &unit.statements[0] {
            Node::FnDecl { decorators, .. } => {
                assert_eq!(decorators, &vec![Node::Ident("traced".to_string())]);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn unescapes_string_literals() {
        let unit = parse("/m.tys", r#"const s = "line\nbreak";"#).expect("parse");
        match &unit.statements[0] {
            Node::VarDecl { init, .. } => {
                assert_eq!(**init, Node::Str("line\nbreak".to_string()));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn rejects_decorated_variable() {
        let err = parse("/m.tys", "@traced const x = 1;").unwrap_err();
        assert!(matches!(err, CoreError::ParseError(_)));
    }

    #[test]
    fn rejects_missing_semicolon() {
        let err = parse("/m.tys", "const x = 1").unwrap_err();
        assert!(matches!(err, CoreError::ParseError(_)));
    }

    #[test]
    fn rejects_export_inside_function_body() {
        let err = parse("/m.tys", "function f() { export const x = 1; }").unwrap_err();
        assert!(matches!(err, CoreError::ParseError(_)));
    }
}
