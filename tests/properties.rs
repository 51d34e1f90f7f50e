use tel_rs::error::TranslateError;
use tel_rs::formula::Formula;
use tel_rs::frontier::TruthValue;
use tel_rs::horizon::{HorizonManager, Theory};
use tel_rs::literal::Lit;
use tel_rs::path::Path;
use tel_rs::rule::Rule;
use tel_rs::stable::Program;
use tel_rs::step::Stage;

use test_log::test;

fn a() -> Formula {
    Formula::atom("a")
}

fn b() -> Formula {
    Formula::atom("b")
}

/// Everything emitted so far, with open externals left free.
fn program(hm: &HorizonManager) -> Program {
    let mut prg = Program::new();
    for batch in hm.history() {
        prg.add_rules(batch.rules.iter().cloned());
    }
    for ext in hm.open_externals() {
        prg.add_free(ext.lit.atom());
    }
    prg
}

/// Literal of `formula` at `step`, for atoms (no rules emitted).
fn lit(hm: &mut HorizonManager, formula: &Formula, step: usize) -> Lit {
    let t = hm.translate(formula, step).unwrap();
    assert!(t.rules.is_empty());
    t.literal
}

/// Open choices over `formula` at steps `0..n`.
fn choices(hm: &mut HorizonManager, formula: &Formula, n: usize) -> Vec<Lit> {
    (0..n).map(|t| lit(hm, formula, t)).collect()
}

#[test]
fn test_idempotent_caching() {
    let mut hm = HorizonManager::new(Theory::new()).unwrap();
    hm.extend_horizon().unwrap();
    hm.extend_horizon().unwrap();

    let f = Formula::since(a(), Formula::and(b(), Formula::next(a())));
    let first = hm.translate(&f, 1).unwrap();
    assert!(!first.rules.is_empty());
    let second = hm.translate(&f, 1).unwrap();
    assert_eq!(first.literal, second.literal);
    assert!(second.rules.is_empty());

    let other = hm.translate(&f, 0).unwrap();
    assert_ne!(other.literal, first.literal);
    assert!(hm.translator().cache().hits() > 0);
}

#[test]
fn test_always_degenerates_to_facts() {
    let theory = Theory::new().with(Stage::Always, Formula::always(a()));
    let mut hm = HorizonManager::new(theory).unwrap();
    for step in 0..3 {
        let batch = hm.extend_horizon().unwrap();
        println!("{}", batch);
        assert_eq!(batch.rules.len(), 1);
        let rule = &batch.rules[0];
        assert!(rule.body.is_empty());
        assert_eq!(hm.describe(rule.head[0]), Some(format!("a@{}", step)));
    }
    assert!(hm.carriers().is_empty());

    // ad hoc at the edge: exactly `a.`
    let rules = hm.require(&Formula::always(b()), 2).unwrap();
    let b2 = lit(&mut hm, &b(), 2);
    assert_eq!(rules, vec![Rule::fact(b2.atom())]);
    assert!(hm.carriers().is_empty());
}

#[test]
fn test_eventually_unrolling() {
    let theory = Theory::new().with(Stage::Initial, Formula::eventually(a()));
    let mut hm = HorizonManager::new(theory).unwrap();
    for _ in 0..3 {
        hm.extend_horizon().unwrap();
    }
    let atoms = choices(&mut hm, &a(), 3);
    let carrier = hm
        .carriers()
        .iter()
        .find(|c| c.step == 2)
        .map(|c| c.lit)
        .unwrap();

    let mut prg = program(&hm);
    prg.add_rules(atoms.iter().map(|l| Rule::choice(l.atom())));
    let models = prg.models();
    assert!(!models.is_empty());
    for m in &models {
        let any = atoms.iter().any(|&l| m.holds(l));
        assert_eq!(m.holds(carrier), any);
    }

    // taking step 2 as the last one, the eventuality must be met
    let closing = hm.closing_assumptions();
    let closed = prg.models_assuming(&closing);
    assert_eq!(closed.len(), 7);
    assert!(closed.iter().all(|m| m.holds(carrier)));
}

#[test]
fn test_final_stage_under_closing_assumptions() {
    let theory = Theory::new().with(Stage::Final, b());
    let mut hm = HorizonManager::new(theory).unwrap();
    hm.extend_horizon().unwrap();
    hm.extend_horizon().unwrap();
    let ys = choices(&mut hm, &b(), 2);

    let closing = hm.closing_assumptions();
    assert_eq!(closing.len(), 1);
    let assumed = program(&hm).models_assuming(&closing);
    assert_eq!(assumed.len(), 1);
    assert!(!assumed[0].holds(ys[0]));
    assert!(assumed[0].holds(ys[1]));

    // closing for real gives the same answer
    hm.mark_final(1).unwrap();
    let closed = program(&hm).models();
    assert_eq!(closed.len(), 1);
    assert!(!closed[0].holds(ys[0]));
    assert!(closed[0].holds(ys[1]));
}

#[test]
fn test_assumed_last_agrees_with_mark_final() {
    // `a` is needed at the only step and forbidden at the last one
    let theory = Theory::new()
        .with(Stage::Initial, Formula::eventually(a()))
        .with(Stage::Final, Formula::not(a()));
    let mut hm = HorizonManager::new(theory).unwrap();
    hm.extend_horizon().unwrap();
    let closing = hm.closing_assumptions();
    assert!(program(&hm).models_assuming(&closing).is_empty());
    assert!(!program(&hm).models().is_empty());

    hm.mark_final(0).unwrap();
    assert!(program(&hm).models().is_empty());
}

#[test]
fn test_next_at_frontier() {
    let mut hm = HorizonManager::new(Theory::new()).unwrap();
    hm.extend_horizon().unwrap();
    let e = hm.translate(&Formula::next(a()), 0).unwrap().literal;
    let open = hm.open_externals();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].lit, e);
    assert_eq!(open[0].truth, TruthValue::Free);

    let batch = hm.extend_horizon().unwrap();
    assert_eq!(batch.released, vec![e]);
    assert!(batch.externals.iter().all(|x| x.lit != e));
    assert!(hm.open_externals().is_empty());

    let a1 = lit(&mut hm, &a(), 1);
    assert!(batch.rules.contains(&Rule::normal(e.atom(), [a1])));

    let mut prg = program(&hm);
    prg.add_rule(Rule::choice(a1.atom()));
    let models = prg.models();
    assert_eq!(models.len(), 2);
    for m in &models {
        assert_eq!(m.holds(e), m.holds(a1));
    }
}

#[test]
fn test_closed_horizon_forces_next() {
    let mut hm = HorizonManager::new(Theory::new()).unwrap();
    hm.extend_horizon().unwrap();
    hm.extend_horizon().unwrap();
    let strong = hm.translate(&Formula::next(a()), 1).unwrap().literal;
    let weak = hm.translate(&Formula::weak_next(a()), 1).unwrap().literal;

    let batch = hm.mark_final(1).unwrap();
    assert!(batch.released.contains(&strong));
    assert!(batch.released.contains(&weak));
    assert!(batch.externals.is_empty());
    assert!(hm.open_externals().is_empty());
    assert!(batch.rules.contains(&Rule::fact(weak.atom())));
    assert!(batch.rules.iter().all(|r| !r.head.contains(&strong.atom())));

    let models = program(&hm).models();
    assert_eq!(models.len(), 1);
    assert!(!models[0].holds(strong));
    assert!(models[0].holds(weak));
}

#[test]
fn test_strong_next_required_at_last_step_is_unsatisfiable() {
    let theory = Theory::new().with(Stage::Initial, Formula::next(a()));
    let mut hm = HorizonManager::new(theory).unwrap();
    hm.extend_horizon().unwrap();
    hm.mark_final(0).unwrap();
    assert!(program(&hm).models().is_empty());
}

#[test]
fn test_star_path_round_trip() {
    let mut hm = HorizonManager::new(Theory::new()).unwrap();
    for _ in 0..3 {
        hm.extend_horizon().unwrap();
    }
    hm.mark_final(2).unwrap();

    // <(?a ;; &true)*> b
    let f = Formula::diamond(Path::star(Path::guarded_step(a())), b());
    let t = hm.translate(&f, 0).unwrap();
    let xs = choices(&mut hm, &a(), 3);
    let ys = choices(&mut hm, &b(), 3);

    let mut prg = program(&hm);
    prg.add_rules(t.rules);
    prg.add_rules(xs.iter().chain(&ys).map(|l| Rule::choice(l.atom())));
    let models = prg.models();
    assert_eq!(models.len(), 64);
    for m in &models {
        let accepted = (0..3).any(|k| m.holds(ys[k]) && (0..k).all(|j| m.holds(xs[j])));
        assert_eq!(m.holds(t.literal), accepted);
    }
}

#[test]
fn test_no_retroactive_mutation() {
    let theory = Theory::new()
        .with(Stage::Always, Formula::until(a(), b()))
        .with(Stage::Initial, Formula::always(Formula::or(a(), Formula::next(b()))))
        .with(Stage::Dynamic, Formula::implies(Formula::previous(a()), Formula::weak_next(b())));
    let mut hm = HorizonManager::new(theory).unwrap();

    let mut returned = Vec::new();
    let mut before = hm.translator().num_atoms() as u32;
    for _ in 0..4 {
        let batch = hm.extend_horizon().unwrap();
        // only fresh atoms and closed externals get defining rules
        for rule in &batch.rules {
            for &h in &rule.head {
                assert!(h > before || batch.released.iter().any(|l| l.atom() == h), "{}", rule);
            }
        }
        before = hm.translator().num_atoms() as u32;
        returned.push(batch);
    }
    returned.push(hm.mark_final(3).unwrap());

    assert_eq!(hm.history().len(), returned.len());
    for (kept, seen) in hm.history().iter().zip(&returned) {
        assert_eq!(kept.to_string(), seen.to_string());
        assert_eq!(kept, seen);
    }
}

#[test]
fn test_host_binding() {
    let mut hm = HorizonManager::new(Theory::new()).unwrap();
    hm.extend_horizon().unwrap();
    let host = hm.new_literal();
    let f = Formula::or(a(), Formula::once(b()));
    assert!(hm.bind(&f, 0, host).unwrap().is_empty());
    assert_eq!(hm.translate(&f, 0).unwrap().literal, host);

    let late = hm.new_literal();
    assert!(matches!(
        hm.bind(&f, 0, late),
        Err(TranslateError::LateBinding { step: 0, .. })
    ));
}

#[test]
fn test_host_binding_on_atom_ties_right_away() {
    let mut hm = HorizonManager::new(Theory::new()).unwrap();
    hm.extend_horizon().unwrap();
    let host = hm.new_literal();
    let rules = hm.bind(&a(), 0, host).unwrap();
    assert_eq!(rules.len(), 3);

    let a0 = lit(&mut hm, &a(), 0);
    let mut prg = Program::new();
    prg.add_rules(rules);
    prg.add_rule(Rule::choice(a0.atom()));
    for m in prg.models() {
        assert_eq!(m.holds(host), m.holds(a0));
    }
}
