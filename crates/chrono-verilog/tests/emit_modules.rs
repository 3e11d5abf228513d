use chrono_parse::parse_str;
use chrono_verilog::{emit, emit_to, EmitError};

fn compile(src: &str) -> String {
    let modules = parse_str("<mem>", src).expect("parse ok");
    emit(&modules).expect("emit ok")
}

fn compile_err(src: &str) -> EmitError {
    let modules = parse_str("<mem>", src).expect("parse ok");
    emit(&modules).expect_err("emit should fail")
}

#[test]
fn module_round_trip() {
    let out = compile("mod(in a, out [8] b) { b = a; }");
    assert_eq!(
        out,
        "module mod (\n\
         \tinput a,\n\
         \toutput [7:0] b\n\
         );\n\
         \tassign b = a;\n\
         endmodule\n"
    );
}

#[test]
fn port_qualifiers() {
    let out = compile(
        "ports(in clk, inout [2] bus, out reg r, out [16] q @clk, out w @!clk) { }",
    );
    let ports: Vec<&str> = out.lines().skip(1).take(5).collect();
    assert_eq!(
        ports,
        vec![
            "\tinput clk,",
            "\tinout [1:0] bus,",
            "\toutput reg r,",
            "\toutput reg [15:0] q,",
            "\toutput reg w",
        ]
    );
}

#[test]
fn module_without_ports() {
    assert_eq!(compile("top() {}"), "module top (\n);\nendmodule\n");
}

#[test]
fn modules_are_separated_by_a_blank_line() {
    let out = compile("a(in x) {} b(in y) {}");
    assert!(out.contains("endmodule\n\nmodule b ("), "{out}");
}

#[test]
fn arithmetic_keeps_tree_shape() {
    let out = compile(
        "m(in a, in b, in c, out [8] x, out [8] y, out [8] z, out [8] w) {
            x = a + b * c;
            y = (a + b) * c;
            z = a - (b - c);
            w = a << 2 >> b;
        }",
    );
    assert!(out.contains("\tassign x = a + b * c;\n"), "{out}");
    assert!(out.contains("\tassign y = (a + b) * c;\n"), "{out}");
    assert!(out.contains("\tassign z = a - (b - c);\n"), "{out}");
    assert!(out.contains("\tassign w = a << 2 >> b;\n"), "{out}");
}

#[test]
fn body_declarations_are_rendered() {
    let out = compile("m(in a, out y) { wire [4] t; reg r @a; t = a; y = t; }");
    assert!(out.contains("\twire [3:0] t;\n\treg r;\n\tassign t = a;\n"), "{out}");
}

#[test]
fn registered_assignment_uses_the_port_clock() {
    let out = compile("dff(in clk, in d, out q @!clk) { q <- d; }");
    assert_eq!(
        out,
        "module dff (\n\
         \tinput clk,\n\
         \tinput d,\n\
         \toutput reg q\n\
         );\n\
         \talways @(negedge clk)\n\
         \t\tq <= d;\n\
         endmodule\n"
    );
}

#[test]
fn clocked_sequence_with_if_else() {
    let out = compile(
        "counter(in clk, in rst, out reg [8] count) {
            @clk {
                if rst == 1 {
                    count <- 0;
                } else {
                    count <- count + 1;
                }
            }
        }",
    );
    let body: Vec<&str> = out.lines().skip(5).collect();
    assert_eq!(
        body,
        vec![
            "\talways @(posedge clk) begin",
            "\t\tif (rst == 1) begin",
            "\t\t\tcount <= 0;",
            "\t\tend else begin",
            "\t\t\tcount <= count + 1;",
            "\t\tend",
            "\tend",
            "endmodule",
        ]
    );
}

#[test]
fn combinational_if_chain() {
    let out = compile(
        "sel(in a, in b, out reg [2] y) {
            if a == b { y = 0; } else if a > b { y = 1; } else { y = 2; }
        }",
    );
    let body: Vec<&str> = out.lines().skip(5).collect();
    assert_eq!(
        body,
        vec![
            "\talways @(*) begin",
            "\t\tif (a == b) begin",
            "\t\t\ty = 0;",
            "\t\tend else if (a > b) begin",
            "\t\t\ty = 1;",
            "\t\tend else begin",
            "\t\t\ty = 2;",
            "\t\tend",
            "\tend",
            "endmodule",
        ]
    );
}

#[test]
fn nested_block_in_procedure_gets_begin_end() {
    let out = compile("m(in clk, in d, out reg q) { @clk { { q <- d; } } }");
    assert!(
        out.contains("\talways @(posedge clk) begin\n\t\tbegin\n\t\t\tq <= d;\n\t\tend\n\tend\n"),
        "{out}"
    );
}

#[test]
fn signal_declared_in_if_body_is_not_visible_after_it() {
    let err = compile_err(
        "m(in a, out reg y, out z) {
            if a { wire t; y = t; }
            z = t;
        }",
    );
    let EmitError::UndeclaredSignal { name, pos } = err else {
        panic!("expected UndeclaredSignal, got {err:?}");
    };
    assert_eq!(name, "t");
    assert_eq!(pos.line, 3);
}

#[test]
fn nested_block_scope_is_popped() {
    let err = compile_err("m(in a, out y) { { wire t; t = a; } y = t; }");
    assert!(matches!(err, EmitError::UndeclaredSignal { ref name, .. } if name == "t"));
}

#[test]
fn shadowing_declaration_gets_a_fresh_name() {
    let out = compile("m(in a, out y) { wire t; { wire [2] t; t = a; } t = a; y = t; }");
    let body: Vec<&str> = out.lines().skip(4).collect();
    assert_eq!(
        body,
        vec![
            "\twire t;",
            "\twire [1:0] t_1;",
            "\tassign t_1 = a;",
            "\tassign t = a;",
            "\tassign y = t;",
            "endmodule",
        ]
    );
}

#[test]
fn block_signal_shadowing_a_port_leaves_the_port_alone() {
    let out = compile("m(in a, out b) { { wire b; b = a; } }");
    assert_eq!(
        out,
        "module m (\n\
         \tinput a,\n\
         \toutput b\n\
         );\n\
         \twire b_1;\n\
         \tassign b_1 = a;\n\
         endmodule\n"
    );
}

#[test]
fn signal_declared_in_if_body_is_hoisted() {
    let out = compile("m(in a, in c, out reg y) { if c { reg t; t = a; y = t; } }");
    let body: Vec<&str> = out.lines().skip(5).collect();
    assert_eq!(
        body,
        vec![
            "\treg t;",
            "\talways @(*) begin",
            "\t\tif (c) begin",
            "\t\t\tt = a;",
            "\t\t\ty = t;",
            "\t\tend",
            "\tend",
            "endmodule",
        ]
    );
}

#[test]
fn signal_declared_in_clocked_body_is_hoisted() {
    let out = compile("m(in clk, in d, out reg q) { @clk { reg [4] t; t <- d; q <- t; } }");
    let body: Vec<&str> = out.lines().skip(5).collect();
    assert_eq!(
        body,
        vec![
            "\treg [3:0] t;",
            "\talways @(posedge clk) begin",
            "\t\tt <= d;",
            "\t\tq <= t;",
            "\tend",
            "endmodule",
        ]
    );
}

#[test]
fn procedural_shadow_of_a_port_does_not_drive_it() {
    let out = compile("m(in a, in c, out reg y) { if c { reg y; y = a; } }");
    assert!(out.contains("\n\treg y_1;\n"), "{out}");
    assert!(out.contains("\t\t\ty_1 = a;\n"), "{out}");
    assert!(!out.contains("\ty = a;"), "{out}");
}

#[test]
fn sibling_branches_get_distinct_names() {
    let out = compile(
        "m(in a, in c, out reg y) {
            if c { reg t; t = a; y = t; } else { reg t; t = c; y = t; }
        }",
    );
    assert!(out.contains("\treg t;\n\treg t_1;\n\talways @(*) begin\n"), "{out}");
    assert!(out.contains("\t\t\tt = a;\n\t\t\ty = t;\n"), "{out}");
    assert!(out.contains("\t\t\tt_1 = c;\n\t\t\ty = t_1;\n"), "{out}");
}

#[test]
fn every_module_starts_with_a_clean_namespace() {
    let out = compile("a(in x) { { wire t; } } b(in x) { { wire t; } }");
    assert_eq!(out.matches("\twire t;\n").count(), 2, "{out}");
    assert!(!out.contains("t_1"), "{out}");
}

#[test]
fn duplicate_declaration_in_same_block() {
    let err = compile_err("m(in a) { wire t; wire t; }");
    assert!(matches!(err, EmitError::DuplicateSignal { ref name, .. } if name == "t"));
}

#[test]
fn duplicate_port_names() {
    let err = compile_err("m(in a, out a) { }");
    assert!(matches!(err, EmitError::DuplicateSignal { .. }));
}

#[test]
fn undeclared_target() {
    let err = compile_err("m(in a) { nope = a; }");
    assert!(matches!(err, EmitError::UndeclaredSignal { ref name, .. } if name == "nope"));
}

#[test]
fn registered_assignment_needs_a_clock() {
    let err = compile_err("m(in d, out reg q) { q <- d; }");
    assert!(matches!(err, EmitError::MissingClock { ref name, .. } if name == "q"));
}

#[test]
fn clock_must_be_declared() {
    let err = compile_err("m(in d, out q @clk) { q <- d; }");
    assert!(matches!(err, EmitError::UndeclaredSignal { ref name, .. } if name == "clk"));
}

#[test]
fn registered_assignment_in_combinational_block() {
    let err = compile_err("m(in clk, in a, out q @clk) { if a { q <- a; } }");
    assert!(matches!(err, EmitError::RegisteredInCombinational { .. }));
}

#[test]
fn storage_must_match_assignment_kind() {
    let err = compile_err("m(in a, out reg q) { q = a; }");
    assert!(matches!(
        err,
        EmitError::StorageMismatch { needs_reg: false, .. }
    ));

    let err = compile_err("m(in a, out y) { if a { y = 1; } }");
    assert!(matches!(err, EmitError::StorageMismatch { needs_reg: true, .. }));
}

#[test]
fn nested_sequence_is_unsupported() {
    let err = compile_err("m(in clk, out reg q) { @clk { @clk q <- 1; } }");
    assert!(matches!(err, EmitError::UnsupportedNode { .. }));
}

#[test]
fn emit_to_writes_the_same_text() {
    let modules = parse_str("<mem>", "mod(in a, out [8] b) { b = a; }").expect("parse ok");
    let mut buf = Vec::new();
    emit_to(&modules, &mut buf).expect("emit ok");
    assert_eq!(String::from_utf8(buf).unwrap(), emit(&modules).unwrap());
}

#[test]
fn failed_emission_writes_nothing() {
    let modules = parse_str("<mem>", "m(in a) { nope = a; }").expect("parse ok");
    let mut buf = Vec::new();
    assert!(emit_to(&modules, &mut buf).is_err());
    assert!(buf.is_empty());
}
