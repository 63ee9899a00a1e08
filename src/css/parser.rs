//! CSS parsing
//!
//! Parses stylesheet text into the rule/selector/term model. The parser
//! recovers from errors: a bad rule is skipped to the end of its block, a
//! bad declaration to the next semicolon, and parsing continues. Errors
//! are collected so callers can report them.

use super::types::{
    Combinator, CssParseResult, Declaration, ImportRule, Rule, Selector, SelectorComponent,
    SelectorPart, SimpleElement, StyleRule, Stylesheet, Term,
};
use crate::error::ParseError as CrateParseError;
use cssparser::{Delimiter, ParseError, Parser, ParserInput, Token};
use std::path::PathBuf;
use std::rc::Rc;

// ============================================================================
// Entry points
// ============================================================================

/// Parse a stylesheet.
///
/// `base_dir` is the directory the stylesheet text was read from; it is
/// recorded for resolving `url(...)` terms and `@import` targets. Parsing
/// never fails outright: unusable rules are dropped and reported in the
/// result's error list.
pub fn parse_stylesheet(css: &str, base_dir: Option<Rc<PathBuf>>) -> CssParseResult {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    let mut rules = Vec::new();
    let mut errors = Vec::new();
    parse_rule_list(&mut parser, &mut rules, &mut errors, true);

    CssParseResult {
        stylesheet: Stylesheet { rules, base_dir },
        errors,
    }
}

/// Parse a bare declaration list, as found in an inline style attribute.
///
/// Malformed declarations are skipped individually.
pub fn parse_declaration_list(css: &str) -> Vec<Rc<Declaration>> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_declaration_block(&mut parser)
}

// ============================================================================
// Rule parsing
// ============================================================================

fn parse_rule_list<'i>(
    parser: &mut Parser<'i, '_>,
    rules: &mut Vec<Rule>,
    errors: &mut Vec<CrateParseError>,
    top_level: bool,
) {
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let start = parser.state();
        let at_keyword: Option<String> = match parser.next() {
            Err(_) => break,
            Ok(Token::AtKeyword(kw)) => Some(kw.to_ascii_lowercase()),
            Ok(_) => None,
        };

        match at_keyword {
            Some(kw) => parse_at_rule(parser, &kw, rules, errors, top_level),
            None => {
                parser.reset(&start);
                let location = parser.current_source_location();
                match parse_style_rule(parser) {
                    Ok(rule) => rules.push(Rule::Style(rule)),
                    Err(_) => {
                        errors.push(CrateParseError::InvalidSelector {
                            message: "unparseable rule dropped".to_string(),
                            line: location.line + 1,
                            column: location.column,
                        });
                        skip_to_end_of_block(parser);
                    }
                }
            }
        }
    }
}

fn parse_at_rule<'i>(
    parser: &mut Parser<'i, '_>,
    keyword: &str,
    rules: &mut Vec<Rule>,
    errors: &mut Vec<CrateParseError>,
    top_level: bool,
) {
    match keyword {
        "import" if top_level => {
            let location = parser.current_source_location();
            match parse_import_href(parser) {
                Ok(href) => rules.push(Rule::Import(ImportRule::new(href))),
                Err(_) => {
                    errors.push(CrateParseError::InvalidCss {
                        message: "malformed @import dropped".to_string(),
                        line: location.line + 1,
                        column: location.column,
                    });
                    skip_at_rule(parser);
                }
            }
        }
        // The condition is not evaluated; the nested ruleset always
        // participates in the cascade.
        "media" if top_level => {
            loop {
                match parser.next() {
                    Ok(Token::CurlyBracketBlock) => break,
                    Ok(Token::Semicolon) | Err(_) => return,
                    Ok(_) => continue,
                }
            }
            let _: Result<(), ParseError<()>> = parser.parse_nested_block(|nested| {
                parse_rule_list(nested, rules, errors, false);
                Ok(())
            });
        }
        _ => {
            tracing::debug!(keyword, "skipping unsupported at-rule");
            skip_at_rule(parser);
        }
    }
}

fn parse_import_href<'i>(parser: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let token = parser.next()?.clone();
    let href = match token {
        Token::QuotedString(s) => s.to_string(),
        Token::UnquotedUrl(url) => url.to_string(),
        Token::Function(name) if name.eq_ignore_ascii_case("url") => {
            parser.parse_nested_block(|block| {
                let href = block.expect_string()?.to_string();
                Ok::<_, ParseError<()>>(href)
            })?
        }
        _ => return Err(parser.new_custom_error(())),
    };
    // Any trailing media list is ignored.
    let _: Result<(), ParseError<()>> =
        parser.parse_until_after(Delimiter::Semicolon, |rest| {
            while rest.next().is_ok() {}
            Ok(())
        });
    Ok(href)
}

fn parse_style_rule<'i>(parser: &mut Parser<'i, '_>) -> Result<StyleRule, ParseError<'i, ()>> {
    let selectors =
        parser.parse_until_before(Delimiter::CurlyBracketBlock, parse_selector_list)?;
    parser.expect_curly_bracket_block()?;
    let declarations = parser.parse_nested_block(|block| {
        Ok::<_, ParseError<()>>(parse_declaration_block(block))
    })?;
    Ok(StyleRule {
        selectors,
        declarations,
    })
}

/// Skip forward past the next curly-bracket block (error recovery).
fn skip_to_end_of_block(parser: &mut Parser<'_, '_>) {
    while let Ok(token) = parser.next() {
        if matches!(token, Token::CurlyBracketBlock) {
            let _: Result<(), ParseError<()>> = parser.parse_nested_block(|block| {
                while block.next().is_ok() {}
                Ok(())
            });
            break;
        }
    }
}

/// Skip an at-rule body: everything up to a semicolon or through a block.
fn skip_at_rule(parser: &mut Parser<'_, '_>) {
    loop {
        match parser.next() {
            Ok(Token::CurlyBracketBlock) => {
                let _: Result<(), ParseError<()>> = parser.parse_nested_block(|block| {
                    while block.next().is_ok() {}
                    Ok(())
                });
                break;
            }
            Ok(Token::Semicolon) => break,
            Err(_) => break,
            Ok(_) => continue,
        }
    }
}

// ============================================================================
// Selector parsing
// ============================================================================

fn parse_selector_list<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Vec<Selector>, ParseError<'i, ()>> {
    let mut selectors = Vec::new();
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut current: Option<SelectorPart> = None;
    let mut pending = Combinator::None;

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_) => {
                if let Some(part) = current.take() {
                    parts.push(part);
                    pending = Combinator::Descendant;
                }
            }
            Token::Delim('>') => {
                if let Some(part) = current.take() {
                    parts.push(part);
                }
                if parts.is_empty() {
                    return Err(parser.new_custom_error(()));
                }
                pending = Combinator::Child;
            }
            Token::Delim('+') | Token::Delim('~') => {
                if let Some(part) = current.take() {
                    parts.push(part);
                }
                if parts.is_empty() {
                    return Err(parser.new_custom_error(()));
                }
                pending = Combinator::Sibling;
            }
            Token::Ident(name) => {
                if current.is_some() {
                    return Err(parser.new_custom_error(()));
                }
                current = Some(begin_part(
                    &mut pending,
                    SimpleElement::Named(name.to_string()),
                ));
            }
            Token::Delim('*') => {
                if current.is_some() {
                    return Err(parser.new_custom_error(()));
                }
                current = Some(begin_part(&mut pending, SimpleElement::Universal));
            }
            Token::Hash(id) | Token::IDHash(id) => {
                ensure_part(&mut current, &mut pending)
                    .components
                    .push(SelectorComponent::Id(id.to_string()));
            }
            Token::Delim('.') => {
                let class = match parser.next_including_whitespace() {
                    Ok(Token::Ident(name)) => name.to_string(),
                    _ => return Err(parser.new_custom_error(())),
                };
                ensure_part(&mut current, &mut pending)
                    .components
                    .push(SelectorComponent::Class(class));
            }
            Token::Colon => {
                let component = parse_pseudo(parser)?;
                ensure_part(&mut current, &mut pending)
                    .components
                    .push(component);
            }
            Token::SquareBracketBlock => {
                let _: Result<(), ParseError<()>> = parser.parse_nested_block(|block| {
                    while block.next().is_ok() {}
                    Ok(())
                });
                ensure_part(&mut current, &mut pending)
                    .components
                    .push(SelectorComponent::Unsupported("[...]".to_string()));
            }
            Token::Comma => {
                finish_selector(&mut selectors, &mut parts, &mut current, &mut pending)
                    .map_err(|_| parser.new_custom_error(()))?;
            }
            _ => return Err(parser.new_custom_error(())),
        }
    }

    finish_selector(&mut selectors, &mut parts, &mut current, &mut pending)
        .map_err(|_| parser.new_custom_error(()))?;
    if selectors.is_empty() {
        return Err(parser.new_custom_error(()));
    }
    Ok(selectors)
}

fn parse_pseudo<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<SelectorComponent, ParseError<'i, ()>> {
    let token = match parser.next_including_whitespace() {
        Ok(token) => token.clone(),
        Err(_) => return Err(parser.new_custom_error(())),
    };
    match token {
        Token::Ident(name) => Ok(SelectorComponent::PseudoClass(name.to_string())),
        // `::element`
        Token::Colon => match parser.next_including_whitespace() {
            Ok(Token::Ident(name)) => Ok(SelectorComponent::Unsupported(format!("::{}", name))),
            _ => Err(parser.new_custom_error(())),
        },
        // `:fn(...)`
        Token::Function(name) => {
            let name = name.to_string();
            let _: Result<(), ParseError<()>> = parser.parse_nested_block(|block| {
                while block.next().is_ok() {}
                Ok(())
            });
            Ok(SelectorComponent::Unsupported(format!(":{}(...)", name)))
        }
        _ => Err(parser.new_custom_error(())),
    }
}

fn begin_part(pending: &mut Combinator, element: SimpleElement) -> SelectorPart {
    let combinator = std::mem::replace(pending, Combinator::None);
    SelectorPart {
        combinator,
        element,
        components: Vec::new(),
    }
}

fn ensure_part<'a>(
    current: &'a mut Option<SelectorPart>,
    pending: &mut Combinator,
) -> &'a mut SelectorPart {
    current.get_or_insert_with(|| begin_part(pending, SimpleElement::Universal))
}

fn finish_selector(
    selectors: &mut Vec<Selector>,
    parts: &mut Vec<SelectorPart>,
    current: &mut Option<SelectorPart>,
    pending: &mut Combinator,
) -> Result<(), ()> {
    if let Some(part) = current.take() {
        parts.push(part);
    }
    // A pending descendant is just trailing whitespace; `>` or `+` with
    // nothing to their right is an error.
    let trailing = std::mem::replace(pending, Combinator::None);
    if matches!(trailing, Combinator::Child | Combinator::Sibling) {
        return Err(());
    }
    if parts.is_empty() {
        // empty alternative: only an error mid-list (`a,,b`); at end of
        // input there is simply nothing left to flush
        return if selectors.is_empty() { Ok(()) } else { Err(()) };
    }
    if parts[0].combinator != Combinator::None {
        return Err(());
    }
    selectors.push(Selector {
        parts: std::mem::take(parts),
    });
    Ok(())
}

// ============================================================================
// Declaration parsing
// ============================================================================

fn parse_declaration_block(parser: &mut Parser<'_, '_>) -> Vec<Rc<Declaration>> {
    let mut declarations = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let property = match parser.next() {
            Err(_) => break,
            // stray semicolons are harmless
            Ok(Token::Semicolon) => continue,
            Ok(Token::Ident(name)) => name.to_ascii_lowercase(),
            Ok(_) => {
                tracing::debug!("skipping malformed declaration (expected property name)");
                recover_declaration(parser);
                continue;
            }
        };
        if parser.expect_colon().is_err() {
            tracing::debug!(property, "skipping malformed declaration (expected ':')");
            recover_declaration(parser);
            continue;
        }

        let mut important = false;
        let terms = parser
            .parse_until_after(Delimiter::Semicolon, |value| {
                Ok::<_, ParseError<()>>(parse_term_sequence(value, &mut important))
            })
            .unwrap_or_default();

        if terms.is_empty() {
            tracing::debug!(property, "skipping declaration with empty value");
            continue;
        }
        declarations.push(Rc::new(Declaration {
            property,
            terms,
            important,
        }));
    }

    declarations
}

/// Skip to the next semicolon so the following declaration can be tried.
fn recover_declaration(parser: &mut Parser<'_, '_>) {
    let _: Result<(), ParseError<()>> = parser.parse_until_after(Delimiter::Semicolon, |rest| {
        while rest.next().is_ok() {}
        Ok(())
    });
}

fn parse_term_sequence(parser: &mut Parser<'_, '_>, important: &mut bool) -> Vec<Term> {
    let mut terms = Vec::new();
    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Ident(name) => terms.push(Term::Ident(name.to_string())),
            Token::QuotedString(s) => terms.push(Term::Str(s.to_string())),
            Token::Number {
                value, int_value, ..
            } => terms.push(Term::Number {
                value,
                int: int_value.is_some(),
            }),
            Token::Percentage { unit_value, .. } => {
                terms.push(Term::Percentage(unit_value * 100.0));
            }
            Token::Dimension { value, unit, .. } => terms.push(Term::Dimension {
                value,
                unit: unit.to_ascii_lowercase(),
            }),
            Token::Hash(digits) | Token::IDHash(digits) => {
                terms.push(Term::HexColor(digits.to_string()));
            }
            Token::UnquotedUrl(url) => terms.push(Term::Url(url.to_string())),
            Token::Function(name) => {
                let name = name.to_ascii_lowercase();
                let args = parser
                    .parse_nested_block(|block| {
                        let mut nested_important = false;
                        Ok::<_, ParseError<()>>(parse_term_sequence(block, &mut nested_important))
                    })
                    .unwrap_or_default();
                if name == "url" {
                    if let Some(Term::Str(path)) = args.first() {
                        terms.push(Term::Url(path.clone()));
                    }
                } else {
                    terms.push(Term::Function { name, args });
                }
            }
            Token::Comma => terms.push(Term::Comma),
            Token::Delim('/') => terms.push(Term::Slash),
            Token::Delim('!') => {
                if parser
                    .try_parse(|rest| rest.expect_ident_matching("important"))
                    .is_ok()
                {
                    *important = true;
                }
            }
            Token::ParenthesisBlock | Token::SquareBracketBlock | Token::CurlyBracketBlock => {
                let _: Result<(), ParseError<()>> = parser.parse_nested_block(|block| {
                    while block.next().is_ok() {}
                    Ok(())
                });
            }
            _ => {}
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(css: &str) -> CssParseResult {
        parse_stylesheet(css, None)
    }

    fn style_rules(result: &CssParseResult) -> Vec<&StyleRule> {
        result
            .stylesheet
            .rules
            .iter()
            .filter_map(|rule| match rule {
                Rule::Style(style) => Some(style),
                Rule::Import(_) => None,
            })
            .collect()
    }

    #[test]
    fn parses_type_id_class_pseudo_chain() {
        let result = parse("Bin > Label#title.big:hover { color: red; }");
        assert!(result.is_ok());
        let rules = style_rules(&result);
        assert_eq!(rules.len(), 1);
        let selector = &rules[0].selectors[0];
        assert_eq!(selector.parts.len(), 2);
        assert_eq!(selector.parts[1].combinator, Combinator::Child);
        assert_eq!(
            selector.parts[1].element,
            SimpleElement::Named("Label".to_string())
        );
        assert_eq!(selector.parts[1].components.len(), 3);
    }

    #[test]
    fn parses_selector_lists_and_universal() {
        let result = parse("* , Widget .pad { padding: 4px; }");
        let rules = style_rules(&result);
        assert_eq!(rules[0].selectors.len(), 2);
        assert_eq!(rules[0].selectors[0].parts[0].element, SimpleElement::Universal);
        let second = &rules[0].selectors[1];
        assert_eq!(second.parts.len(), 2);
        assert_eq!(second.parts[1].combinator, Combinator::Descendant);
        assert_eq!(second.parts[1].element, SimpleElement::Universal);
    }

    #[test]
    fn declaration_terms_and_important() {
        let result = parse("a { margin: 1px 2em; color: #fff !important; }");
        let rules = style_rules(&result);
        let decls = &rules[0].declarations;
        assert_eq!(decls.len(), 2);
        assert_eq!(
            decls[0].terms,
            vec![
                Term::Dimension { value: 1.0, unit: "px".to_string() },
                Term::Dimension { value: 2.0, unit: "em".to_string() },
            ]
        );
        assert!(!decls[0].important);
        assert_eq!(decls[1].terms, vec![Term::HexColor("fff".to_string())]);
        assert!(decls[1].important);
    }

    #[test]
    fn rgba_function_becomes_term_function() {
        let result = parse("a { color: rgba(255, 0, 0, 0.5); }");
        let rules = style_rules(&result);
        match &rules[0].declarations[0].terms[0] {
            Term::Function { name, args } => {
                assert_eq!(name, "rgba");
                // three commas between four numbers
                assert_eq!(args.len(), 7);
            }
            other => panic!("expected function term, got {:?}", other),
        }
    }

    #[test]
    fn attribute_selector_parses_as_unsupported() {
        let result = parse("Widget[attr=x] { color: red; }");
        assert!(result.is_ok());
        let rules = style_rules(&result);
        let part = &rules[0].selectors[0].parts[0];
        assert!(matches!(
            part.components[0],
            SelectorComponent::Unsupported(_)
        ));
    }

    #[test]
    fn sibling_combinator_parses_as_sibling() {
        let result = parse("Label + Label { color: red; }");
        let rules = style_rules(&result);
        assert_eq!(
            rules[0].selectors[0].parts[1].combinator,
            Combinator::Sibling
        );
    }

    #[test]
    fn malformed_declaration_is_skipped_alone() {
        let result = parse("a { color red; padding: 2px; }");
        let rules = style_rules(&result);
        assert_eq!(rules[0].declarations.len(), 1);
        assert_eq!(rules[0].declarations[0].property, "padding");
    }

    #[test]
    fn malformed_rule_is_dropped_and_parsing_continues() {
        let result = parse("a %% { color: red; } b { color: blue; }");
        assert!(!result.is_ok());
        let rules = style_rules(&result);
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].selectors[0].parts[0].element,
            SimpleElement::Named("b".to_string())
        );
    }

    #[test]
    fn media_rules_are_included_without_evaluation() {
        let result = parse("@media screen { a { color: red; } } b { color: blue; }");
        let rules = style_rules(&result);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn comments_are_ignored() {
        let result = parse("/* lead */ a /* mid */ { /* body */ color: red; }");
        assert!(result.is_ok());
        let rules = style_rules(&result);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].declarations.len(), 1);
    }

    #[test]
    fn import_rule_is_recorded() {
        let result = parse("@import url(\"extra.css\"); a { color: red; }");
        assert!(result.is_ok());
        let import = result
            .stylesheet
            .rules
            .iter()
            .find_map(|rule| match rule {
                Rule::Import(import) => Some(import),
                Rule::Style(_) => None,
            })
            .expect("import rule");
        assert_eq!(import.href, "extra.css");
    }

    #[test]
    fn inline_declaration_list_parses() {
        let decls = parse_declaration_list("color: red; padding: 1px");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].property, "color");
        assert_eq!(decls[1].property, "padding");
    }

    #[test]
    fn font_shorthand_slash_is_preserved() {
        let decls = parse_declaration_list("font: bold 12px/1.5 sans-serif");
        assert!(decls[0].terms.contains(&Term::Slash));
    }
}
