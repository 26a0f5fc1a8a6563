// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! End-to-end rendering of call sites, unpack merges, formatted strings, and
//! coroutine definitions across dialect revisions.

use tugdecomp_core::tree::CO_COROUTINE;
use tugdecomp_core::{CodeObject, Token};
use tugdecomp_semantics::test_helpers::{
    argc, call, code, constant, dict_const_keys, kwarg, name, name_at, names_const, node, opcode,
    render, render_ok, string_const, tuple,
};
use tugdecomp_semantics::{
    build_registry, decompile, render_tree, RenderError, RenderOptions, Revision, Tree,
    PRECEDENCE_BODY,
};

const ALL_REVISIONS: &[Revision] = &[
    Revision::V2_7,
    Revision::V3_0,
    Revision::V3_1,
    Revision::V3_2,
    Revision::V3_3,
    Revision::V3_4,
    Revision::V3_5,
    Revision::V3_6,
    Revision::V3_7,
    Revision::V3_8,
];

fn tuple_merge(ops: Vec<Tree>) -> Tree {
    let n = ops.len() as i64;
    let mut children = ops;
    children.push(opcode(&format!("BUILD_TUPLE_UNPACK_WITH_CALL_{n}"), n));
    node("build_tuple_unpack_with_call", children)
}

fn map_merge(ops: Vec<Tree>) -> Tree {
    let n = ops.len() as i64;
    let mut children = ops;
    children.push(opcode(&format!("BUILD_MAP_UNPACK_WITH_CALL_{n}"), n));
    node("build_map_unpack_with_call", children)
}

fn extended(positional: Tree, keywords: Tree) -> Tree {
    node(
        "call_ex_kw",
        vec![name("f"), positional, keywords, opcode("CALL_FUNCTION_EX_KW", 1)],
    )
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_variadic_positional() {
    let tree = call(vec![
        name("f"),
        name("a"),
        name("b"),
        name("rest"),
        opcode("CALL_FUNCTION_VAR_2", argc(2, 0)),
    ]);
    for revision in [Revision::V3_2, Revision::V3_4, Revision::V3_5] {
        assert_eq!(render_ok(revision, &tree), "f(a, b, *rest)", "{revision}");
    }
}

#[test]
fn scenario_b_keywords_before_star_pre35() {
    let tree = call(vec![
        name("f"),
        name("a"),
        name("b"),
        kwarg("k", name("v")),
        name("rest"),
        opcode("CALL_FUNCTION_VAR_258", argc(2, 1)),
    ]);
    assert_eq!(render_ok(Revision::V3_4, &tree), "f(a, b, *rest, k=v)");
}

#[test]
fn scenario_b_star_before_keywords_35() {
    let tree = call(vec![
        name("f"),
        name("a"),
        name("b"),
        name("rest"),
        kwarg("k", name("v")),
        opcode("CALL_FUNCTION_VAR_258", argc(2, 1)),
    ]);
    assert_eq!(render_ok(Revision::V3_5, &tree), "f(a, b, *rest, k=v)");
}

#[test]
fn scenario_c_mapping_merge_with_literal_dict() {
    let tree = extended(
        tuple(vec![]),
        map_merge(vec![dict_const_keys(&[("x", constant("1"))]), name("extra")]),
    );
    assert_eq!(render_ok(Revision::V3_6, &tree), "f(x=1, **extra)");
}

// ============================================================================
// Properties
// ============================================================================

/// One fixture per extended-call shape.
fn extended_shapes() -> Vec<(&'static str, Tree, &'static str)> {
    vec![
        (
            "both merged",
            extended(
                tuple_merge(vec![tuple(vec![name("a")]), name("r")]),
                map_merge(vec![dict_const_keys(&[("k", name("v"))]), name("m")]),
            ),
            "f(a, *r, k=v, **m)",
        ),
        (
            "positional merged",
            extended(tuple_merge(vec![name("p"), name("q")]), name("m")),
            "f(*p, *q, **m)",
        ),
        (
            "keyword merged",
            extended(tuple(vec![name("a"), name("b")]), map_merge(vec![name("m"), name("n")])),
            "f(a, b, **m, **n)",
        ),
        (
            "neither merged",
            extended(name("args"), dict_const_keys(&[("x", constant("1"))])),
            "f(*args, x=1)",
        ),
    ]
}

#[test]
fn extended_calls_bind_like_a_body() {
    for revision in [Revision::V3_6, Revision::V3_7, Revision::V3_8] {
        let registry = build_registry(revision);
        for tag in ["call_ex_kw", "call_ex_kw2", "call_ex_kw3", "call_ex_kw4"] {
            assert_eq!(registry.precedence().get(tag), Some(PRECEDENCE_BODY));
        }
    }
}

#[test]
fn extended_calls_have_no_extra_parens() {
    for (label, tree, expected) in extended_shapes() {
        // Bound 100: rendered directly.
        assert_eq!(render_ok(Revision::V3_6, &tree), expected, "{label}");
        // Bound 200: the expression of a statement.
        let stmt = node("expr_stmt", vec![tree]);
        assert_eq!(
            render_ok(Revision::V3_6, &stmt),
            format!("{expected}\n"),
            "{label}"
        );
    }
}

#[test]
fn extended_call_parenthesized_below_body_bound() {
    let (_, tree, expected) = extended_shapes().remove(1);
    let attribute = node(
        "attribute",
        vec![tree, Token::new("LOAD_ATTR", "real").into()],
    );
    assert_eq!(
        render_ok(Revision::V3_6, &attribute),
        format!("({expected}).real")
    );
}

#[test]
fn counted_calls_render_in_canonical_order() {
    // (positional, keywords, star, double star) -> expected
    let cases: &[(u8, u8, bool, bool, &str)] = &[
        (0, 0, false, false, "f()"),
        (2, 0, false, false, "f(p0, p1)"),
        (1, 2, false, false, "f(p0, k0=v0, k1=v1)"),
        (1, 0, true, false, "f(p0, *rest)"),
        (0, 1, true, false, "f(*rest, k0=v0)"),
        (2, 1, true, false, "f(p0, p1, *rest, k0=v0)"),
        (1, 1, true, true, "f(p0, *rest, k0=v0, **more)"),
    ];
    for &(p, k, star, double_star, expected) in cases {
        for revision in [Revision::V3_3, Revision::V3_5] {
            let opcode_name = match (star, double_star) {
                (false, false) => "CALL_FUNCTION",
                (true, false) => "CALL_FUNCTION_VAR",
                (true, true) => "CALL_FUNCTION_VAR_KW",
                (false, true) => unreachable!(),
            };
            let mut children = vec![name("f")];
            children.extend((0..p).map(|i| name(&format!("p{i}"))));
            let keywords: Vec<Tree> = (0..k)
                .map(|i| kwarg(&format!("k{i}"), name(&format!("v{i}"))))
                .collect();
            let star_before = revision >= Revision::V3_5;
            if star && star_before {
                children.push(name("rest"));
            }
            children.extend(keywords);
            if star && !star_before {
                children.push(name("rest"));
            }
            if double_star {
                children.push(name("more"));
            }
            let word = argc(p, k);
            children.push(opcode(&format!("{opcode_name}_{word}"), word));
            let tree = call(children);

            // The 3.2-3.4 handler leaves `*args, **kwargs` to the generic
            // template, which writes keywords before the star.
            if double_star && !star_before {
                assert_eq!(
                    render_ok(revision, &tree),
                    "f(p0, k0=v0, *rest, **more)",
                    "{revision}"
                );
                continue;
            }
            assert_eq!(render_ok(revision, &tree), expected, "{revision} {opcode_name}");
        }
    }
}

#[test]
fn argument_count_mismatch_is_fatal() {
    let tree = call(vec![
        name("f"),
        name("a"),
        opcode("CALL_FUNCTION_VAR_KW_3", argc(3, 0)),
    ]);
    for revision in [Revision::V3_3, Revision::V3_5, Revision::V3_6] {
        let err = render(revision, &tree).unwrap_err();
        assert!(
            matches!(err, RenderError::ArgCountMismatch { .. }),
            "{revision}: {err}"
        );
        assert_eq!(err.kind(), "call");
    }
}

#[test]
fn unpack_merge_preserves_operand_order() {
    let merge = tuple_merge(vec![
        node("expr", vec![tuple(vec![name("a0"), name("a1")])]),
        name("B"),
        name("C"),
    ]);
    let tree = extended(merge, name("kw"));
    let first = render_ok(Revision::V3_6, &tree);
    assert_eq!(first, "f(a0, a1, *B, *C, **kw)");
    assert_eq!(render_ok(Revision::V3_6, &tree), first);
}

#[test]
fn conversion_codes() {
    for (code, suffix) in [(0, ""), (1, "!s"), (2, "!r"), (3, "!a"), (4, ""), (-1, "")] {
        let tree = node(
            "fstring_single",
            vec![name("x"), opcode("FORMAT_VALUE", code)],
        );
        assert_eq!(
            render_ok(Revision::V3_6, &tree),
            format!("f'''{{x{suffix}}}'''")
        );
    }
}

#[test]
fn fstring_without_interpolation_is_plain_literal() {
    let tree = node(
        "fstring_multi",
        vec![string_const("hello"), opcode("BUILD_STRING_1", 1)],
    );
    assert_eq!(render_ok(Revision::V3_7, &tree), "'hello'");
}

#[test]
fn async_qualifier_follows_coroutine_flag() {
    let def = |flags: u32| {
        let mkfunc = node(
            "mkfunc",
            vec![
                code(CodeObject::new("f").with_flags(flags).with_params(["a"])),
                opcode("LOAD_CONST", 0),
                opcode("MAKE_FUNCTION_0", 0),
            ],
        );
        node("function_def", vec![mkfunc, opcode("STORE_NAME", 0)])
    };
    for revision in [Revision::V3_6, Revision::V3_7] {
        let coroutine = render_ok(revision, &def(CO_COROUTINE));
        assert_eq!(coroutine, "\n\nasync def f(a):\n    pass\n\n");
        let plain = render_ok(revision, &def(0));
        assert!(!plain.contains("async"));
    }
}

#[test]
fn multi_line_calls_keep_their_breaks() {
    let tree = node(
        "call_kw36",
        vec![
            name_at("f", 1),
            name_at("a", 1),
            name_at("one", 2),
            name_at("two", 2),
            names_const(&["x", "y"]),
            opcode("CALL_FUNCTION_KW_3", 3),
        ],
    );
    let expected = "f(a,\n    x=one, y=two)";
    let first = render_ok(Revision::V3_6, &tree);
    assert_eq!(first, expected);
    assert_eq!(render_ok(Revision::V3_6, &tree), first);

    let registry = build_registry(Revision::V3_6);
    let options = RenderOptions::new(Revision::V3_6).with_line_breaks(false);
    assert_eq!(
        render_tree(&registry, &options, &tree).unwrap(),
        "f(a, x=one, y=two)"
    );
}

#[test]
fn every_revision_renders_a_plain_call() {
    let tree = call(vec![
        name("f"),
        name("a"),
        opcode("CALL_FUNCTION_1", argc(1, 0)),
    ]);
    for &revision in ALL_REVISIONS {
        let options = RenderOptions::new(revision);
        assert_eq!(decompile(&options, &tree).unwrap(), "f(a)", "{revision}");
    }
}

#[test]
fn unknown_revision_uses_nearest_overlays() {
    let tree = call(vec![
        name("f"),
        name("rest"),
        opcode("CALL_FUNCTION_EX", 0),
    ]);
    let future = Revision::new(3, 12);
    assert_eq!(render_ok(future, &tree), "f(*rest)");
}
