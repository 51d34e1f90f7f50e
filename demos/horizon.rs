use std::collections::HashSet;

use clap::{Parser, ValueEnum};

use tel_rs::formula::Formula;
use tel_rs::horizon::{HorizonManager, Theory};
use tel_rs::path::Path;
use tel_rs::rule::Rule;
use tel_rs::stable::{Program, MAX_CANDIDATES};
use tel_rs::step::Stage;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Example {
    /// `>? a` from the initial state.
    Eventually,
    /// `>* a` everywhere.
    Always,
    /// `a >? b` from the initial state.
    Until,
    /// `a >* b` from the initial state.
    Release,
    /// `<(?a ;; &true)*> b` from the initial state.
    Star,
    /// `>> a` from the initial state.
    AtEnd,
}

impl Example {
    fn theory(self) -> Theory {
        let a = Formula::atom("a");
        let b = Formula::atom("b");
        match self {
            Example::Eventually => Theory::new().with(Stage::Initial, Formula::eventually(a)),
            Example::Always => Theory::new().with(Stage::Always, Formula::always(a)),
            Example::Until => Theory::new().with(Stage::Initial, Formula::until(a, b)),
            Example::Release => Theory::new().with(Stage::Initial, Formula::release(a, b)),
            Example::Star => {
                let f = Formula::diamond(Path::star(Path::guarded_step(a)), b);
                Theory::new().with(Stage::Initial, f)
            }
            Example::AtEnd => Theory::new().with(Stage::Initial, Formula::at_end(a)),
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Theory to unroll.
    #[arg(long, value_enum, default_value = "eventually")]
    formula: Example,

    /// Number of steps.
    #[clap(long, value_name = "INT", default_value = "3")]
    steps: usize,

    /// Close the horizon after the last step.
    #[clap(long)]
    close: bool,

    /// Enumerate the stable models of the emitted program.
    #[clap(long)]
    models: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let mut hm = HorizonManager::new(args.formula.theory())?;
    for _ in 0..args.steps {
        let batch = hm.extend_horizon()?;
        print!("{}", batch);
    }
    if args.close && args.steps > 0 {
        let batch = hm.mark_final(args.steps - 1)?;
        print!("{}", batch);
    }

    println!("% atoms");
    for atom in 1..=hm.translator().num_atoms() as u32 {
        if let Some(name) = hm.describe(atom) {
            println!("x{} = {}", atom, name);
        }
    }
    println!("carriers: {}", hm.carriers().len());
    println!("cache hits: {}", hm.translator().cache().hits());
    println!("cache misses: {}", hm.translator().cache().misses());

    if args.models {
        let mut program = Program::new();
        let mut derived = HashSet::new();
        for batch in hm.history() {
            derived.extend(batch.rules.iter().flat_map(|r| r.head.iter().copied()));
            program.add_rules(batch.rules.iter().cloned());
        }
        for ext in hm.open_externals() {
            program.add_free(ext.lit.atom());
        }
        // atoms nothing derives are left open
        for (_, lit) in hm.translator().symbols().iter() {
            if !derived.contains(&lit.atom()) {
                program.add_rule(Rule::choice(lit.atom()));
            }
        }

        if program.num_candidates() > MAX_CANDIDATES {
            log::warn!(
                "{} candidate atoms, too many to enumerate (at most {})",
                program.num_candidates(),
                MAX_CANDIDATES
            );
        } else {
            let models = program.models();
            println!("Total {} stable model(s)", models.len());
            for (i, model) in models.iter().enumerate() {
                let mut names = model.atoms().filter_map(|a| hm.describe(a)).collect::<Vec<_>>();
                names.sort();
                println!("model #{}: {}", i + 1, names.join(" "));
            }
        }
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
