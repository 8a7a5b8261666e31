use bar_optimizer::render;
use bar_optimizer::solver::Solver;
use bar_optimizer::types::Item;
use clap::Parser;

const MAX_BAR_LENGTH: u32 = 100_000;
const MAX_KERF: u32 = 50;
const MAX_ITEMS: usize = 200;

#[derive(Parser)]
#[command(name = "bar_optimizer", about = "1D bar cutting stock optimizer")]
struct Cli {
    /// Stock bar length in mm
    #[arg(long)]
    bar: u32,

    /// Required pieces as LENGTHxCOUNT (e.g. 1200x20 900x9)
    #[arg(long = "items", num_args = 1..)]
    items: Vec<String>,

    /// Blade kerf width in mm (default: 0)
    #[arg(long, default_value_t = 0)]
    kerf: u32,

    /// Show ASCII layout of each bar
    #[arg(long)]
    layout: bool,
}

fn parse_item(s: &str) -> Result<Item, String> {
    let lower = s.to_lowercase();
    let (a, b) = lower
        .split_once('x')
        .or_else(|| lower.split_once(':'))
        .ok_or_else(|| format!("invalid item '{}', expected LENGTHxCOUNT", s))?;
    let length = a
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let count = b
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid count in '{}'", s))?;
    if length == 0 || count == 0 {
        return Err(format!("length and count must be non-zero in '{}'", s));
    }
    Ok(Item::new(length, count))
}

fn main() {
    let cli = Cli::parse();

    if cli.bar == 0 || cli.bar > MAX_BAR_LENGTH {
        eprintln!("Error: bar length must be between 1 and {MAX_BAR_LENGTH}");
        std::process::exit(1);
    }
    if cli.kerf > MAX_KERF {
        eprintln!("Error: kerf must be between 0 and {MAX_KERF}");
        std::process::exit(1);
    }
    if cli.items.len() > MAX_ITEMS {
        eprintln!("Error: too many items (limit {MAX_ITEMS})");
        std::process::exit(1);
    }

    let items: Vec<Item> = cli
        .items
        .iter()
        .map(|s| parse_item(s))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    // Validate all pieces fit on a bar before solving
    for item in &items {
        if item.length > cli.bar {
            eprintln!(
                "Error: piece {} does not fit on a {} bar",
                item.length, cli.bar
            );
            std::process::exit(1);
        }
    }

    let solver = Solver::new(cli.bar, cli.kerf, items);
    let solution = solver.solve();

    // Output results
    for (i, bar) in solution.bars.iter().enumerate() {
        let combo = bar
            .combo
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        println!("Bar {}: {} | waste {}", i + 1, combo, bar.waste);
        if cli.layout {
            print!("{}", render::render_bar(cli.bar, cli.kerf, bar));
        }
    }

    if let Some(error) = solution.error {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }

    if let Some(stats) = solution.stats {
        println!(
            "Summary: {} bar{} used ({} ideal), {:.1}% efficiency, total waste {}",
            stats.real_bars,
            if stats.real_bars == 1 { "" } else { "s" },
            stats.ideal_bars,
            stats.efficiency * 100.0,
            stats.total_waste,
        );
    }
}
