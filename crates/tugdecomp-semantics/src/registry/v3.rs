// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Overlays for the 3.x revisions, applied in ascending order.

use tugdecomp_core::Revision;

use super::{RuleTable, VariantRule};
use crate::calls::{async_call, call_35, call_36, call_kw36, call_pre35, extended_call, CallVariant};
use crate::coroutine::{function_def, yield_from};
use crate::fstring::{formatted_value, fstring_expr, fstring_multi, fstring_single};
use crate::functions::mkfunc_annotate;
use crate::precedence::{PrecedenceTable, PRECEDENCE_BODY};
use crate::statements::{except_suite_finalize, return_closure};
use crate::template::{Selector, Template};
use crate::unpack::{build_map_unpack_with_call, build_tuple_unpack_with_call, starred, unmapexpr};

/// Constructs that bind like a whole body from 3.6 on.
const BODY_PRECEDENCE_36: &[&str] = &[
    "call_kw",
    "call_kw36",
    "call_ex",
    "call_ex_kw",
    "call_ex_kw2",
    "call_ex_kw3",
    "call_ex_kw4",
];

pub(super) fn install(rules: &mut RuleTable, precedence: &mut PrecedenceTable, revision: Revision) {
    install_30(rules);
    if revision.at_least(Revision::V3_3) {
        rules.insert_handler("yield_from", yield_from);
    }
    if revision.within(Revision::V3_2, Revision::V3_4) {
        rules.insert_handler("call", call_pre35);
    }
    if revision.at_least(Revision::V3_4) {
        rules.insert_template("LOAD_CLASSDEREF", Template::text("%{pattr}"));
    }
    if revision.at_least(Revision::V3_5) {
        install_35(rules);
    }
    if revision == Revision::V3_5 {
        rules.insert_handler("call", call_35);
    }
    if revision.at_least(Revision::V3_6) {
        install_36(rules, precedence);
    }
}

fn install_30(rules: &mut RuleTable) {
    rules.insert_template(
        "function_def_annotate",
        Template::new("\n\n%|def %c%c\n", vec![Selector::at(-1), Selector::at(0)]),
    );
    rules.insert_template(
        "store_locals",
        Template::text("%|# inspect.currentframe().f_locals = __locals__\n"),
    );
    rules.insert_handler("mkfunc_annotate", mkfunc_annotate);
}

fn install_35(rules: &mut RuleTable) {
    let at = Selector::at;
    rules.insert_template("await_expr", Template::new("await %c", vec![at(0)]));
    rules.insert_template("await_stmt", Template::new("%|%c\n", vec![at(0)]));
    rules.insert_template(
        "async_for_stmt",
        Template::new(
            "%|async for %c in %c:\n%+%c%-\n\n",
            vec![at(9), at(1), at(25)],
        ),
    );
    rules.insert_template(
        "async_forelse_stmt",
        Template::new(
            "%|async for %c in %c:\n%+%c%-%|else:\n%+%c%-\n\n",
            vec![at(9), at(1), at(25), at(28)],
        ),
    );
    rules.insert_template(
        "async_with_stmt",
        Template::new("%|async with %c:\n%+%c%-", vec![at(0), at(7)]),
    );
    rules.insert_template(
        "async_with_as_stmt",
        Template::new("%|async with %c as %c:\n%+%c%-", vec![at(0), at(6), at(7)]),
    );
    rules.insert_template(
        "unmap_dict",
        Template::new("{**%C}", vec![Selector::range(0, -1, ", **")]),
    );
    rules.insert_template(
        "build_list_unpack",
        Template::new(
            "[*%P]",
            vec![Selector::range(0, -1, ", *").with_prec(PRECEDENCE_BODY)],
        ),
    );
    rules.insert_handler("async_call", async_call);
    rules.insert_handler("function_def", function_def);
    rules.insert_handler("unmapexpr", unmapexpr);
}

fn install_36(rules: &mut RuleTable, precedence: &mut PrecedenceTable) {
    for &tag in BODY_PRECEDENCE_36 {
        precedence.set(tag, PRECEDENCE_BODY);
    }

    let at = Selector::at;
    rules.insert_template(
        "tryfinally36",
        Template::new(
            "%|try:\n%+%c%-%|finally:\n%+%c%-\n\n",
            vec![at(1).expecting("returns"), at(3)],
        ),
    );
    let interpolation = || Template::new("{%c%{conversion}}", vec![at(0)]);
    rules.insert_template("fstring_expr", interpolation());
    rules.insert_template("formatted_value", interpolation());
    rules.insert_template(
        "fstring_single",
        Template::new("f'''{%c%{conversion}}'''", vec![at(0)]),
    );
    rules.insert_template("func_args36", Template::new("%c(**", vec![at(0)]));
    rules.insert_template(
        "try_except36",
        Template::new("%|try:\n%+%c%-%c\n\n", vec![at(1), at(2)]),
    );
    rules.insert_template("except_return", Template::new("%|except:\n%+%c%-", vec![at(3)]));
    rules.insert_template(
        "unpack_list",
        Template::new("*%c", vec![at(0).expecting("list")]),
    );
    rules.insert_template(
        "call_ex",
        Template::new(
            "%c(%p)",
            vec![at(0).expecting("expr"), at(1).with_prec(PRECEDENCE_BODY)],
        ),
    );

    rules.insert_variant(
        "call",
        CallVariant::Ex,
        VariantRule::uniform(Template::new(
            "%c(*%P)",
            vec![at(0), Selector::range(1, 2, ", ").with_prec(PRECEDENCE_BODY)],
        )),
    );
    rules.insert_variant(
        "call",
        CallVariant::ExKeyword,
        VariantRule::uniform(Template::new(
            "%c(*%c, **%c)",
            vec![at(0), at(1), at(2)],
        )),
    );

    rules.insert_handler("build_tuple_unpack_with_call", build_tuple_unpack_with_call);
    rules.insert_handler("build_map_unpack_with_call", build_map_unpack_with_call);
    for tag in ["call_ex_kw", "call_ex_kw2", "call_ex_kw3", "call_ex_kw4"] {
        rules.insert_handler(tag, extended_call);
    }
    rules.insert_handler("call_kw36", call_kw36);
    rules.insert_handler("starred", starred);
    rules.insert_handler("except_suite_finalize", except_suite_finalize);
    rules.insert_handler("formatted_value", formatted_value);
    rules.insert_handler("fstring_expr", fstring_expr);
    rules.insert_handler("fstring_single", fstring_single);
    rules.insert_handler("fstring_multi", fstring_multi);
    rules.insert_handler("return_closure", return_closure);
    rules.insert_handler("call", call_36);
}
