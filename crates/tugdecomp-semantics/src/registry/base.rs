// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Revision-independent rules.

use super::{RuleTable, VariantRule};
use crate::arguments::{dict_literal, tuple_literal};
use crate::calls::CallVariant;
use crate::functions::mkfunc;
use crate::precedence::{PRECEDENCE_BODY, PRECEDENCE_STATEMENT};
use crate::template::{Selector, Template};

/// Tokens that render as their display payload.
const NAME_TOKENS: &[&str] = &[
    "LOAD_NAME",
    "LOAD_GLOBAL",
    "LOAD_FAST",
    "LOAD_DEREF",
    "LOAD_CONST",
    "LOAD_STR",
    "STORE_NAME",
    "STORE_FAST",
    "STORE_GLOBAL",
    "STORE_DEREF",
];

fn args() -> Selector {
    Selector::range(1, -1, ", ").with_prec(PRECEDENCE_BODY)
}

pub(super) fn install(rules: &mut RuleTable) {
    for &token in NAME_TOKENS {
        rules.insert_template(token, Template::text("%{pattr}"));
    }

    // Expressions
    rules.insert_template("kwarg", Template::new("%[0]{attr}=%c", vec![Selector::at(1)]));
    rules.insert_template("attribute", Template::new("%c.%[1]{pattr}", vec![Selector::at(0)]));
    rules.insert_template(
        "list",
        Template::new(
            "[%P]",
            vec![Selector::range(0, -1, ", ").with_prec(PRECEDENCE_BODY)],
        ),
    );
    rules.insert_template(
        "subscript",
        Template::new(
            "%c[%p]",
            vec![Selector::at(0), Selector::at(1).with_prec(PRECEDENCE_BODY)],
        ),
    );
    rules.insert_template(
        "and",
        Template::new("%c and %c", vec![Selector::at(0), Selector::at(2)]),
    );
    rules.insert_template(
        "or",
        Template::new("%c or %c", vec![Selector::at(0), Selector::at(2)]),
    );
    rules.insert_template("unary_not", Template::new("not %c", vec![Selector::at(0)]));
    rules.insert_template("yield", Template::new("yield %c", vec![Selector::at(0)]));
    rules.insert_handler("tuple", tuple_literal);
    rules.insert_handler("dict", dict_literal);

    // Statements
    let expression_statement = || {
        Template::new(
            "%|%p\n",
            vec![Selector::at(0).with_prec(PRECEDENCE_STATEMENT)],
        )
    };
    rules.insert_template("expr_stmt", expression_statement());
    rules.insert_template("call_stmt", expression_statement());
    rules.insert_template("return", Template::new("%|return %c\n", vec![Selector::at(0)]));
    rules.insert_template(
        "assign",
        Template::new(
            "%|%c = %p\n",
            vec![Selector::at(-1), Selector::at(0).with_prec(PRECEDENCE_STATEMENT)],
        ),
    );
    rules.insert_template("pass", Template::text("%|pass\n"));
    rules.insert_template(
        "try_except",
        Template::new(
            "%|try:\n%+%c%-%c\n\n",
            vec![Selector::at(1), Selector::at(3)],
        ),
    );
    rules.insert_template("except", Template::new("%|except:\n%+%c%-", vec![Selector::at(3)]));
    rules.insert_template("function_def", Template::new("\n\n%|def %c\n", vec![Selector::at(-2)]));
    rules.insert_handler("mkfunc", mkfunc);

    install_call_variants(rules);
}

/// Generic call templates, one pair per variant. The bare template applies
/// when the opcode's argument count is zero.
fn install_call_variants(rules: &mut RuleTable) {
    let plain = VariantRule::uniform(Template::new("%c(%P)", vec![Selector::at(0), args()]));
    rules.insert_variant("call", CallVariant::Plain, plain.clone());
    rules.insert_variant("call", CallVariant::Method, plain);

    rules.insert_variant(
        "call",
        CallVariant::Keyword,
        VariantRule::new(
            Template::new("%c(**%c)", vec![Selector::at(0), Selector::at(-2)]),
            Template::new(
                "%c(%C, **%c)",
                vec![Selector::at(0), Selector::range(1, -2, ", "), Selector::at(-2)],
            ),
        ),
    );
    rules.insert_variant(
        "call",
        CallVariant::Var,
        VariantRule::new(
            Template::new("%c(*%c)", vec![Selector::at(0), Selector::at(-2)]),
            Template::new(
                "%c(%C, *%c)",
                vec![Selector::at(0), Selector::range(1, -2, ", "), Selector::at(-2)],
            ),
        ),
    );
    rules.insert_variant(
        "call",
        CallVariant::VarKeyword,
        VariantRule::new(
            Template::new(
                "%c(*%c, **%c)",
                vec![Selector::at(0), Selector::at(-3), Selector::at(-2)],
            ),
            Template::new(
                "%c(%C, *%c, **%c)",
                vec![
                    Selector::at(0),
                    Selector::range(1, -3, ", "),
                    Selector::at(-3),
                    Selector::at(-2),
                ],
            ),
        ),
    );
}
