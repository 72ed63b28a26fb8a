use clap::{value_parser, Arg, ArgAction, Command};
use edgeforge_engine::{EvolutionConfig, EvolutionEngine, KindPolicy, TiePolicy};
use edgeforge_model::{read_edge_list, write_edge_list};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Command::new("edgeforge")
        .version(edgeforge_engine::VERSION)
        .about("Evolutionary synthesis of collaboration-platform activity graphs")
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Search for an edge list whose feature spread minimizes discrepancy")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Seed edge list (source,target,type CSV)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination for the completed best edge list"),
                )
                .arg(
                    Arg::new("generations")
                        .long("generations")
                        .default_value("1000")
                        .value_parser(value_parser!(usize))
                        .help("Generation budget"),
                )
                .arg(
                    Arg::new("mu")
                        .long("mu")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Parents kept each generation"),
                )
                .arg(
                    Arg::new("lambda")
                        .long("lambda")
                        .default_value("20")
                        .value_parser(value_parser!(usize))
                        .help("Initial population size"),
                )
                .arg(
                    Arg::new("success-factor")
                        .long("success-factor")
                        .default_value("2.0")
                        .value_parser(value_parser!(f64))
                        .help("Step-size growth factor after a successful generation"),
                )
                .arg(
                    Arg::new("decay-factor")
                        .long("decay-factor")
                        .default_value("0.5")
                        .value_parser(value_parser!(f64))
                        .help("Step-size decay factor after a failed generation"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .default_value("4")
                        .value_parser(value_parser!(usize))
                        .help("Worker threads for fitness evaluation"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("weighted")
                        .long("weighted")
                        .action(ArgAction::SetTrue)
                        .help("Weight PageRank by edge weight"),
                )
                .arg(
                    Arg::new("quiet")
                        .long("quiet")
                        .action(ArgAction::SetTrue)
                        .help("Suppress the interactive progress bar"),
                )
                .arg(
                    Arg::new("tie-policy")
                        .long("tie-policy")
                        .default_value("strict")
                        .value_parser(["strict", "permissive"])
                        .help("Whether an equal score replaces the incumbent best"),
                )
                .arg(
                    Arg::new("kind-policy")
                        .long("kind-policy")
                        .default_value("uniform")
                        .value_parser(["uniform", "rarity"])
                        .help("Kind selection for newly added edges"),
                ),
        );

    let matches = cli.get_matches();
    match matches.subcommand() {
        Some(("run", args)) => {
            let input = args.get_one::<PathBuf>("input").unwrap();
            let output = args.get_one::<PathBuf>("output").unwrap();

            let tie_policy = match args.get_one::<String>("tie-policy").unwrap().as_str() {
                "permissive" => TiePolicy::Permissive,
                _ => TiePolicy::Strict,
            };
            let kind_policy = match args.get_one::<String>("kind-policy").unwrap().as_str() {
                "rarity" => KindPolicy::RarityBiased,
                _ => KindPolicy::Uniform,
            };

            let mut config = EvolutionConfig::new()
                .with_generations(*args.get_one::<usize>("generations").unwrap())
                .with_population(
                    *args.get_one::<usize>("mu").unwrap(),
                    *args.get_one::<usize>("lambda").unwrap(),
                )
                .with_adaptation(
                    *args.get_one::<f64>("success-factor").unwrap(),
                    *args.get_one::<f64>("decay-factor").unwrap(),
                )
                .with_workers(*args.get_one::<usize>("workers").unwrap())
                .with_seed(*args.get_one::<u64>("seed").unwrap())
                .with_tie_policy(tie_policy)
                .with_kind_policy(kind_policy)
                .with_progress(!args.get_flag("quiet"));
            config.weighted = args.get_flag("weighted");

            let dataset = read_edge_list(input)?;
            println!(
                "Loaded {} interactions over {} users and {} repositories",
                dataset.edges.interaction_count(),
                dataset.universe.user_count(),
                dataset.universe.repo_count()
            );

            let engine = EvolutionEngine::new(dataset, config)?;
            let outcome = engine.run()?;

            let completed = engine.complete(&outcome.best);
            write_edge_list(output, &completed, engine.universe())?;

            println!(
                "Best score {:.5} found at generation {}",
                outcome.best_score, outcome.best_generation
            );
            println!(
                "Wrote {} edges ({} follows) to {}",
                completed.len(),
                completed.follows().len(),
                output.display()
            );
            Ok(())
        }
        _ => unreachable!("subcommand required"),
    }
}
