//! Interval Evaluation Tree Translation Tests
//!
//! Tests that bounds translation records the expected tree:
//! - Parameterized leaves become `eval` nodes
//! - Unparameterized leaves become `const` nodes with their bounds
//! - Complements of constants are folded
//! - Conjunctions on one field nest left to right

use aeroplan::bounds::{translate, translate_and_intersect};
use aeroplan::iet::Builder;
use aeroplan::query::{normalize, parameterize, parse_filter, MatchExpression};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

/// Build the tree for `{a: predicate}` against an index on `a`.
fn iet_for(predicate: Value) -> String {
    let filter = json!({ "a": predicate });
    let mut expr = normalize(parse_filter(&filter).expect("filter parses"));
    parameterize(&mut expr);

    let mut builder = Builder::new();
    match &expr {
        MatchExpression::And(children) => {
            let (first, rest) = children.split_first().expect("non-empty conjunction");
            let mut bounds = translate(first, None, Some(&mut builder));
            for child in rest {
                bounds = translate_and_intersect(child, &bounds, None, Some(&mut builder));
            }
        }
        single => {
            translate(single, None, Some(&mut builder));
        }
    }

    builder.done().expect("one root").to_string()
}

fn assert_iet(predicate: Value, expected: &str) {
    let actual = iet_for(predicate.clone());
    assert_eq!(actual, expected, "predicate {}", predicate);
}

fn regex(pattern: &str, options: &str) -> Value {
    json!({ "$regularExpression": { "pattern": pattern, "options": options } })
}

// =============================================================================
// Eval Nodes
// =============================================================================

#[test]
fn test_comparisons_translate_to_eval() {
    assert_iet(json!({ "$eq": 10 }), "(eval $eq #0)");
    assert_iet(json!({ "$lt": 10 }), "(eval $lt #0)");
    assert_iet(json!({ "$lte": 10 }), "(eval $lte #0)");
    assert_iet(json!({ "$gt": 10 }), "(eval $gt #0)");
    assert_iet(json!({ "$gte": 10 }), "(eval $gte #0)");
}

#[test]
fn test_in_and_regex_translate_to_eval() {
    assert_iet(json!({ "$in": [5, 10, 15] }), "(eval $in #0)");
    assert_iet(json!({ "$regex": "aaa" }), "(eval $regex #0)");
}

#[test]
fn test_elem_match_intersects_children() {
    assert_iet(
        json!({ "$elemMatch": { "$lt": 10, "$gt": 1 } }),
        "(intersect (eval $lt #0) (eval $gt #1))",
    );
}

#[test]
fn test_conjunction_nests_in_normalized_order() {
    assert_iet(
        json!({ "$lt": 100, "$gt": 10, "$eq": 11 }),
        "(intersect (intersect (eval $eq #0) (eval $lt #1)) (eval $gt #2))",
    );
}

// =============================================================================
// Const Nodes
// =============================================================================

#[test]
fn test_type_translates_to_const() {
    assert_iet(json!({ "$type": "int" }), "(const [nan.0, inf.0])");
    assert_iet(
        json!({ "$type": ["string", "double"] }),
        "(const [nan.0, inf.0] [\"\", {}))",
    );
    assert_iet(json!({ "$type": "array" }), "(const [MinKey, MaxKey])");
    assert_iet(json!({ "$type": ["int", "array"] }), "(const [MinKey, MaxKey])");
}

#[test]
fn test_mod_translates_to_numeric_const() {
    assert_iet(json!({ "$mod": [2, 3] }), "(const [nan.0, inf.0])");
}

#[test]
fn test_unparameterized_comparisons() {
    assert_iet(json!({ "$lt": { "$maxKey": 1 } }), "(const [MinKey, MaxKey))");
    assert_iet(
        json!({ "$eq": null }),
        "(const [undefined, undefined] [null, null])",
    );
    assert_iet(json!({ "$gt": null }), "(const)");
}

#[test]
fn test_exists() {
    assert_iet(json!({ "$exists": true }), "(const [MinKey, MaxKey])");
    assert_iet(json!({ "$exists": false }), "(const [null, null])");
}

#[test]
fn test_unparameterized_in_lists() {
    assert_iet(
        json!({ "$in": [regex("alpha", "i"), regex("beta", "")] }),
        "(const [\"\", {}) [/alpha/i, /alpha/i] [/beta/, /beta/])",
    );
    assert_iet(
        json!({ "$in": [5, 10, [11]] }),
        "(const [5, 5] [10, 10] [11, 11] [[ 11 ], [ 11 ]])",
    );
    assert_iet(
        json!({ "$in": [regex("alpha", "i"), 101] }),
        "(const [101, 101] [\"\", {}) [/alpha/i, /alpha/i])",
    );
}

#[test]
fn test_internal_expr_comparisons() {
    assert_iet(json!({ "$_internalExprEq": 4 }), "(const [4, 4])");
    assert_iet(json!({ "$_internalExprGt": 4 }), "(const (4, MaxKey])");
}

// =============================================================================
// Complement Nodes
// =============================================================================

#[test]
fn test_not_of_eval_stays_symbolic() {
    assert_iet(json!({ "$not": { "$lt": 10 } }), "(not (eval $lt #0))");
    assert_iet(json!({ "$not": { "$in": [1, 2] } }), "(not (eval $in #0))");
}

#[test]
fn test_not_of_const_is_folded() {
    assert_iet(json!({ "$not": { "$exists": true } }), "(const [null, null])");
    assert_iet(
        json!({ "$not": { "$in": [null, []] } }),
        "(const [MinKey, undefined) (null, []) ([], MaxKey])",
    );
}
