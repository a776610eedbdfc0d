use clap::Parser;

use robdd::manager::Manager;
use robdd::types::Var;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of variable pairs.
    #[arg(value_name = "INT", default_value = "8")]
    pairs: u32,

    /// Maximum growth tolerated while sifting a variable.
    #[clap(long, value_name = "FLOAT", default_value = "1.2")]
    max_growth: f64,
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

    // f = x[0]·y[0] + x[1]·y[1] + ... with all `x` ordered before all `y`,
    // which is the worst order for this function.
    let n = args.pairs;
    let config = robdd::config::ManagerConfig::default().with_max_growth(args.max_growth);
    let m = Manager::with_config(2 * n, config);

    let mut f = m.zero();
    for i in 0..n {
        let x = m.create(Var::new(i), true, false);
        let y = m.create(Var::new(n + i), true, false);
        f = m.or(f, m.and(x, y));
    }
    let f = m.reference(f);
    println!("size before sifting: {}", m.get_size(f));
    println!("models: {}", m.sat_count(f));

    let time_sifting = std::time::Instant::now();
    let (g, stats) = m.sifting_with_stats(f)?;
    println!("size after sifting: {}", m.get_size(g));
    println!(
        "swaps: {}, reduction: {:.1}% in {:.3}s",
        stats.swaps,
        stats.reduction_percent(),
        time_sifting.elapsed().as_secs_f64()
    );

    let order: Vec<String> = m.variable_order().iter().map(|v| v.to_string()).collect();
    println!("order: {}", order.join(" "));
    println!("models: {}", m.sat_count(g));
    println!("manager = {:?}", m);

    println!("\nAll done in {:.3}s", time_total.elapsed().as_secs_f64());
    Ok(())
}
