//! Template parsing: sections, declarations, directive lexing and graph construction.
mod common;
use common::*;
use formsync::lexer::{Directive, DirectiveParser, Lexer, SelectOption, Token};
use formsync::prelude::*;

fn directives_of(state: &SessionState) -> Vec<Directive> {
    state
        .header
        .iter()
        .chain(&state.body)
        .flat_map(|line| line.directives().cloned())
        .collect()
}

#[test]
fn test_lexer_keeps_literal_text_and_unknown_tags() {
    let lexed = Lexer::new().lex_line("a <b> <Var X> c", 1);

    assert!(lexed.diagnostics.is_empty());
    assert_eq!(
        lexed.tokens,
        vec![
            Token::Text("a <b> ".to_string()),
            Token::Directive(Directive::Var {
                raw: "<Var X>".to_string(),
                name: "X".to_string(),
            }),
            Token::Text(" c".to_string()),
        ]
    );
}

#[test]
fn test_lexer_keywords_are_case_insensitive() {
    let lexed = Lexer::new().lex_line("<var call> <ASK Name>", 1);
    let names: Vec<&str> = lexed
        .tokens
        .iter()
        .filter_map(|t| match t {
            Token::Directive(d) => Some(d.name()),
            Token::Text(_) => None,
        })
        .collect();

    assert_eq!(names, vec!["call", "Name"]);
}

#[test]
fn test_lexer_comparison_operators_are_text() {
    let lexed = Lexer::new().lex_line("Cost < 5 & <Var X> > 2", 4);

    assert!(lexed.diagnostics.is_empty());
    assert_eq!(lexed.tokens.len(), 3);
    assert_eq!(lexed.tokens[0], Token::Text("Cost < 5 & ".to_string()));
    assert_eq!(lexed.tokens[2], Token::Text(" > 2".to_string()));
}

#[test]
fn test_malformed_select_stays_literal_with_diagnostic() {
    let lexed = Lexer::new().lex_line("Pick: <Select NOCOLON>", 3);

    assert_eq!(lexed.tokens, vec![Token::Text("Pick: <Select NOCOLON>".to_string())]);
    assert_eq!(lexed.diagnostics.len(), 1);
    assert!(matches!(
        &lexed.diagnostics[0],
        ParseError::MalformedDirective { line: 3, tag, .. } if tag == "<Select NOCOLON>"
    ));
}

#[test]
fn test_unterminated_directive_is_reported() {
    let lexed = Lexer::new().lex_line("To: <Var X", 2);

    assert_eq!(lexed.tokens, vec![Token::Text("To: <Var X".to_string())]);
    assert_eq!(
        lexed.diagnostics,
        vec![ParseError::UnterminatedDirective {
            line: 2,
            fragment: "<Var X".to_string(),
        }]
    );
}

#[test]
fn test_bare_keyword_tags_are_reported() {
    let lexed = Lexer::new().lex_line("<Ask> <Var>", 5);

    assert_eq!(lexed.tokens, vec![Token::Text("<Ask> <Var>".to_string())]);
    assert_eq!(lexed.diagnostics.len(), 2);
    assert!(lexed.diagnostics.iter().all(|d| matches!(
        d,
        ParseError::MalformedDirective { line: 5, .. }
    )));
}

#[test]
fn test_keyword_alias() {
    let parser = Parser::with_lexer(Lexer::new().with_keyword_alias("Input", "Ask"));
    let state = parser.parse("<Input Name,UP>");

    let node = state.graph.get_node("Name").expect("alias should declare a prompt");
    assert_eq!(node.kind, NodeKind::Ask);
    assert!(node.flags.uppercase);
    assert_eq!(state.prompt("Name"), Some("<Input Name,UP>"));
}

struct FieldParser;

impl DirectiveParser for FieldParser {
    fn keyword(&self) -> &str {
        "Field"
    }

    fn parse(&self, raw: &str, args: &str, _line: usize) -> std::result::Result<Directive, ParseError> {
        Ok(Directive::Var {
            raw: raw.to_string(),
            name: args.trim().to_uppercase(),
        })
    }
}

#[test]
fn test_custom_directive_parser() {
    let parser = Parser::with_lexer(Lexer::new().with_custom_parser(Box::new(FieldParser)));
    let state = parser.parse("To: <Field call>");

    assert!(state.graph.contains("CALL"));
    assert_eq!(state.graph.get_node("CALL").map(|n| n.kind), Some(NodeKind::Var));
}

#[test]
fn test_msg_line_splits_header_and_body() {
    let state = parse("To: x\r\nmsg:  \r\nBody <Var A>\r\n");

    assert_eq!(state.header.len(), 1);
    assert_eq!(state.header[0].raw, "To: x");
    assert_eq!(state.body.len(), 2);
    assert_eq!(state.body[0].number, 3);
    assert_eq!(state.body[0].raw, "Body <Var A>");
    assert_eq!(state.body[1].raw, "");
}

#[test]
fn test_only_first_msg_line_splits() {
    let state = parse("A\nMsg:\nB\nMsg:\nC");

    assert_eq!(state.header.len(), 1);
    let body: Vec<&str> = state.body.iter().map(|l| l.raw.as_str()).collect();
    assert_eq!(body, vec!["B", "Msg:", "C"]);
}

#[test]
fn test_template_without_msg_is_all_header() {
    let state = parse("To: <Var A>\nSubj: hi");

    assert_eq!(state.header.len(), 2);
    assert!(state.body.is_empty());
}

#[test]
fn test_declarations_are_read_and_malformed_ones_skipped() {
    let state = parse("Def: BROKEN <desc>\nDEF: GOOD=<Good one>\nDef: =<nameless>\n<Var GOOD>");

    assert_eq!(state.declarations.len(), 1);
    assert_eq!(state.declarations[0].name, "GOOD");
    assert_eq!(state.declarations[0].description, "Good one");
    assert!(state.graph.contains("GOOD"));
    assert!(!state.graph.contains("BROKEN"));

    assert_eq!(state.diagnostics.len(), 2);
    assert!(matches!(state.diagnostics[0], ParseError::MissingAssignment { line: 1, .. }));
    assert!(matches!(state.diagnostics[1], ParseError::EmptyDeclarationName { line: 3, .. }));

    // Declarations are not header lines.
    assert_eq!(state.header.len(), 1);
    assert_eq!(state.header[0].raw, "<Var GOOD>");
}

#[test]
fn test_declaration_in_body_is_plain_text() {
    let state = parse("To: x\nMsg:\nDef: X=<not a declaration>");

    assert!(state.declarations.is_empty());
    assert!(!state.graph.contains("X"));
    assert_eq!(state.body[0].raw, "Def: X=<not a declaration>");
}

#[test]
fn test_scenario_a_graph() {
    let state = parse(SCENARIO_A);

    assert!(state.diagnostics.is_empty());
    assert_eq!(state.graph.len(), 1);
    let node = state.graph.get_node("CALL").unwrap();
    assert_eq!(node.kind, NodeKind::Ask);
    assert_eq!(node.description, "Your callsign");
    assert_eq!(state.prompt("CALL"), Some("<Ask CALL>"));
    assert_eq!(directives_of(&state).len(), 3);
}

#[test]
fn test_undeclared_var_gets_a_node() {
    let state = parse("Hello <Var NAME>");

    let node = state.graph.get_node("NAME").unwrap();
    assert_eq!(node.kind, NodeKind::Var);
    assert_eq!(node.description, "");
    assert_eq!(state.prompt("NAME"), None);
}

#[test]
fn test_ask_flags_are_exact_tokens() {
    let state = parse("<Ask Notes,MU>\n<Ask Call, uppercase >\n<Ask Comment,MUSIC>\n<Ask Both,UP,MU>");

    let notes = state.graph.get_node("Notes").unwrap();
    assert!(notes.flags.multiline);
    assert!(!notes.flags.uppercase);

    let call = state.graph.get_node("Call").unwrap();
    assert!(call.flags.uppercase);
    assert!(!call.flags.multiline);

    let comment = state.graph.get_node("Comment").unwrap();
    assert!(!comment.flags.multiline);
    assert!(!comment.flags.uppercase);

    let both = state.graph.get_node("Both").unwrap();
    assert!(both.flags.multiline && both.flags.uppercase);

    match state.header[2].directives().next() {
        Some(Directive::Ask { extra_flags, .. }) => assert_eq!(extra_flags, &vec!["MUSIC".to_string()]),
        other => panic!("expected an Ask directive, got {:?}", other),
    }
}

#[test]
fn test_ask_description_in_parentheses() {
    let state = parse("<Ask Name (Full legal name)>");

    match directives_of(&state).first() {
        Some(Directive::Ask { description, .. }) => {
            assert_eq!(description.as_deref(), Some("Full legal name"))
        }
        other => panic!("expected an Ask directive, got {:?}", other),
    }
    assert_eq!(
        state.graph.get_node("Name (Full legal name)").map(|n| n.description.as_str()),
        Some("Full legal name")
    );
}

#[test]
fn test_select_options_default_value_to_label() {
    let state = parse("<Select COLOR:Red, Green = G, ,>");

    let node = state.graph.get_node("COLOR").unwrap();
    assert_eq!(node.kind, NodeKind::Select);
    assert_eq!(
        node.options,
        vec![
            SelectOption {
                label: "Red".to_string(),
                value: "Red".to_string(),
            },
            SelectOption {
                label: "Green".to_string(),
                value: "G".to_string(),
            },
        ]
    );
}

#[test]
fn test_last_prompt_for_a_name_wins() {
    let state = parse("<Ask PRIO>\n<Select PRIO:Low,High>");
    assert_eq!(state.graph.get_node("PRIO").map(|n| n.kind), Some(NodeKind::Select));
    assert_eq!(state.prompt("PRIO"), Some("<Select PRIO:Low,High>"));

    let state = parse("<Select PRIO:Low,High>\n<Ask PRIO>");
    assert_eq!(state.graph.get_node("PRIO").map(|n| n.kind), Some(NodeKind::Ask));
    assert_eq!(state.prompt("PRIO"), Some("<Ask PRIO>"));
}

#[test]
fn test_declaration_with_inline_prompt_links_variables() {
    let state = parse("Def: CALL=<Ask Your callsign,UP>\nTo: <Var CALL>");

    let prompt = state.graph.get_node("Your callsign").unwrap();
    assert_eq!(prompt.kind, NodeKind::Ask);
    assert!(prompt.children.contains("CALL"));

    let call = state.graph.get_node("CALL").unwrap();
    assert_eq!(call.kind, NodeKind::Ask);
    assert!(call.flags.uppercase);
    assert!(call.parents.contains("Your callsign"));
    assert_eq!(call.description, "Your callsign");
    assert_eq!(state.prompt("CALL"), Some("<Ask Your callsign,UP>"));
}

#[test]
fn test_own_prompt_after_declaration_is_kept() {
    let state = parse("Def: X=<Ask P>\nMsg:\n<Ask X,UP>\n<Var X>");

    let x = state.graph.get_node("X").unwrap();
    assert_eq!(x.kind, NodeKind::Ask);
    assert!(x.flags.uppercase);
    assert!(x.parents.contains("P"));
    assert_eq!(state.prompt("X"), Some("<Ask X,UP>"));
    assert_eq!(state.prompt("P"), Some("<Ask P>"));
}

#[test]
fn test_general_message_template() {
    let state = parse(GENERAL_MESSAGE);

    assert_eq!(state.declarations.len(), 1);
    assert_eq!(state.diagnostics.len(), 1);
    assert!(matches!(state.diagnostics[0], ParseError::MissingAssignment { line: 2, .. }));
    assert_eq!(state.header.len(), 3);
    assert_eq!(state.body.len(), 7);
    assert_eq!(
        state.graph.names(),
        vec!["Incident name", "MYCALL", "Message", "PRIORITY", "Recipient", "Your callsign"]
    );
    assert!(state.graph.get_node("Message").unwrap().flags.multiline);
    assert_eq!(state.prompt("MYCALL"), Some("<Ask Your callsign,UP>"));
}

#[test]
fn test_restore_values_keeps_surviving_names() {
    let mut previous = parse(SCENARIO_A);
    previous.graph.update_value("CALL", "N0CALL").unwrap();

    let mut state = parse("<Ask CALL>\n<Ask NOTE>");
    state.restore_values(&previous.graph);

    assert_eq!(state.graph.get_node("CALL").unwrap().value(), "N0CALL");
    assert_eq!(state.graph.get_node("NOTE").unwrap().value(), "");
}

#[test]
fn test_header_line_command() {
    let state = parse("To: a\nSubj : b\n<Var X>: c\nplain text");
    let commands: Vec<Option<&str>> = state.header.iter().map(|l| l.command()).collect();

    assert_eq!(commands, vec![Some("To"), Some("Subj"), None, None]);
}
