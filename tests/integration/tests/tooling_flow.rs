//! Tool output -> annotations, lint -> annotations, and CI operations in dry-run

use std::sync::Arc;

use scout_annotations::{
    format_annotation, parse_annotation, parse_typescript_output, render_annotations, summarize,
    Annotation, Level,
};
use scout_ci::{CiConfig, DryRunExecutor, OperationArgs, OperationContext, OperationOutput, OperationTable, Secret};
use scout_lint::{apply_fixes, LintConfig, Linter, Severity};
use serde_json::json;

// ============================================================================
// Annotations
// ============================================================================

#[test]
fn test_typescript_output_to_annotation_lines() {
    let tsc = "\
src/index.ts(10,5): error TS2345: Argument of type 'string' is not assignable to parameter of type 'number'.
src/util/date.ts(3,14): warning TS6133: 'unused' is declared but its value is never read.
Found 2 errors in 2 files.
";
    let annotations = parse_typescript_output(tsc);
    assert_eq!(annotations.len(), 2);

    let first = &annotations[0];
    assert_eq!(first.level, Level::Error);
    assert_eq!(first.file, "src/index.ts");
    assert_eq!((first.line, first.col), (10, 5));
    assert_eq!(first.title.as_deref(), Some("TS2345"));

    let rendered = render_annotations(&annotations);
    let reparsed: Vec<Annotation> = rendered
        .lines()
        .map(|line| parse_annotation(line).unwrap())
        .collect();
    assert_eq!(reparsed, annotations);

    let summary = summarize(&reparsed);
    assert!(summary.has_errors());
    assert_eq!(summary.total(), 2);
}

#[test]
fn test_annotation_with_special_characters() {
    let annotation = Annotation::new(
        Level::Warning,
        "src/a,b:c.ts",
        7,
        1,
        "100% done\nsecond line",
    )
    .with_title("custom: rule");

    let line = format_annotation(&annotation);
    assert!(!line.contains('\n'));
    assert_eq!(parse_annotation(&line).unwrap(), annotation);
}

// ============================================================================
// Lint
// ============================================================================

fn loc(line: u32, start: u32, end: u32) -> serde_json::Value {
    json!({"start": {"line": line, "column": start}, "end": {"line": line, "column": end}})
}

/// `const db = new PrismaClient();` then `console.log(JSON.parse(raw));`
fn test_file_ast() -> serde_json::Value {
    json!({
        "type": "Program",
        "sourceType": "module",
        "loc": loc(1, 0, 29),
        "range": [0, 62],
        "body": [
            {
                "type": "VariableDeclaration",
                "kind": "const",
                "loc": loc(1, 0, 30),
                "declarations": [{
                    "type": "VariableDeclarator",
                    "loc": loc(1, 6, 29),
                    "id": {"type": "Identifier", "name": "db", "loc": loc(1, 6, 8)},
                    "init": {
                        "type": "NewExpression",
                        "loc": loc(1, 11, 29),
                        "callee": {"type": "Identifier", "name": "PrismaClient", "loc": loc(1, 15, 27)},
                        "arguments": []
                    }
                }]
            },
            {
                "type": "ExpressionStatement",
                "loc": loc(2, 0, 31),
                "expression": {
                    "type": "CallExpression",
                    "loc": loc(2, 0, 30),
                    "callee": {
                        "type": "MemberExpression",
                        "computed": false,
                        "loc": loc(2, 0, 11),
                        "object": {"type": "Identifier", "name": "console", "loc": loc(2, 0, 7)},
                        "property": {"type": "Identifier", "name": "log", "loc": loc(2, 8, 11)}
                    },
                    "arguments": [{
                        "type": "CallExpression",
                        "loc": loc(2, 12, 29),
                        "callee": {
                            "type": "MemberExpression",
                            "computed": false,
                            "loc": loc(2, 12, 22),
                            "object": {"type": "Identifier", "name": "JSON", "loc": loc(2, 12, 16)},
                            "property": {"type": "Identifier", "name": "parse", "loc": loc(2, 17, 22)}
                        },
                        "arguments": [{"type": "Identifier", "name": "raw", "loc": loc(2, 23, 26)}]
                    }]
                }
            }
        ]
    })
}

const TEST_FILE_SOURCE: &str = "const db = new PrismaClient();\nconsole.log(JSON.parse(raw));\n";

#[test]
fn test_lint_test_file_to_annotations() {
    let linter = Linter::with_builtin_rules(LintConfig::default());
    let diagnostics = linter
        .lint_ast("src/user.test.ts", TEST_FILE_SOURCE, &test_file_ast())
        .unwrap();

    let rules: Vec<&str> = diagnostics.iter().map(|d| d.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec!["prisma-client-disconnect", "require-structured-logging", "prefer-zod-validation"]
    );

    let annotations: Vec<Annotation> = diagnostics.iter().map(Annotation::from).collect();
    assert_eq!(annotations[0].level, Level::Error);
    assert_eq!(annotations[0].col, 12);
    assert_eq!(annotations[1].level, Level::Warning);
    for annotation in &annotations {
        assert_eq!(&parse_annotation(&format_annotation(annotation)).unwrap(), annotation);
    }

    let fixed = apply_fixes(TEST_FILE_SOURCE, diagnostics.iter().filter_map(|d| d.fix.as_ref()));
    assert_eq!(fixed.applied, 1);
    assert!(fixed.output.ends_with("afterAll(async () => {\n  await db.$disconnect();\n});\n"));
}

#[test]
fn test_lint_configuration_applies() {
    let config = LintConfig::new()
        .with_rule("require-structured-logging", Severity::Off)
        .with_rule("prefer-zod-validation", Severity::Warn);
    let linter = Linter::with_builtin_rules(config);

    // Not a test file: the Prisma rule stays quiet
    let diagnostics = linter
        .lint_ast("src/user.ts", TEST_FILE_SOURCE, &test_file_ast())
        .unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].rule, "prefer-zod-validation");
    assert_eq!(diagnostics[0].severity, Severity::Warn);
}

// ============================================================================
// CI operations
// ============================================================================

#[tokio::test]
async fn test_deploy_dry_run() {
    let executor = Arc::new(DryRunExecutor::new());
    let config = CiConfig::from_toml(
        r#"
        [backend]
        registry = "registry.example.com/scout"
        smoke_command = ["true"]
        # dry runs capture no output
        smoke_expect = ""
        "#,
    )
    .unwrap();
    let ctx = OperationContext::new(Arc::new(config), executor.clone());

    let mut args = OperationArgs::new("/work/repo");
    args.version = Some("3.1.0".to_string());
    args.registry_token = Some(Secret::new("registry-pass"));

    let output = OperationTable::builtin().run("deploy", &ctx, &args).await.unwrap();
    assert_eq!(
        output,
        OperationOutput::Image("registry.example.com/scout/scout-backend:3.1.0".to_string())
    );

    let steps = executor.executed();
    let commands: Vec<String> = steps.iter().map(|s| s.command_line()).collect();
    assert!(commands.iter().all(|c| !c.contains("registry-pass")));
    assert_eq!(
        commands.last().map(String::as_str),
        Some("docker push registry.example.com/scout/scout-backend:3.1.0")
    );
    assert!(commands
        .iter()
        .any(|c| c == "docker login registry.example.com -u scout-ci --password-stdin"));
}
