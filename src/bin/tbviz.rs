use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tbviz::config::DomainPolicy;
use tbviz::loader::{self, LoadReport};
use tbviz::models::Dataset;
use tbviz::render::{self, bitmap};
use tbviz::{AppState, ChartData, Fetcher, Source, UiEvent, VizConfig};
use tbviz::{stats, storage};

#[derive(Parser, Debug)]
#[command(
    name = "tbviz",
    version,
    about = "Render radar, choropleth and dual-axis charts of TB incidence and drug sales"
)]
struct Cli {
    /// JSON config file; missing fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory that relative data paths are resolved against.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Number locale for labels and tooltips (en, de, fr, ...).
    #[arg(long, global = true)]
    locale: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Radar chart of drug sales per country.
    Radar(RadarArgs),
    /// Choropleth map of TB incidence for one year.
    Map(MapArgs),
    /// Incidence and sales of one country on two axes.
    Dual(DualArgs),
    /// Print per-country statistics.
    Stats(DatasetArgs),
    /// Save a dataset as tidy CSV or JSON.
    Export(ExportArgs),
    /// List the countries (and years) of a dataset.
    List(DatasetArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Output file (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// TTF font used for text in PNG output.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RadarArgs {
    #[command(flatten)]
    render: RenderArgs,
    /// Countries separated by comma or semicolon; `All` selects every country.
    #[arg(short, long)]
    select: Option<String>,
}

#[derive(Args, Debug)]
struct MapArgs {
    #[command(flatten)]
    render: RenderArgs,
    /// Year to show (defaults to the configured year, else the latest).
    #[arg(short, long)]
    year: Option<i32>,
}

#[derive(Args, Debug)]
struct DualArgs {
    #[command(flatten)]
    render: RenderArgs,
    /// Country to show (defaults to the first merged country).
    #[arg(short, long)]
    country: Option<String>,
    /// Axis domains from the shown country or from every country.
    #[arg(long, value_enum)]
    domain: Option<DomainArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DomainArg {
    Active,
    Global,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DatasetKind {
    /// Long sales table of the radar chart.
    Sales,
    /// OECD sales table of the dual-axis chart.
    OecdSales,
    /// Wide incidence table of the map.
    Incidence,
    /// Incidence joined with OECD sales.
    Merged,
}

#[derive(Args, Debug)]
struct DatasetArgs {
    #[arg(short, long, value_enum, default_value_t = DatasetKind::Sales)]
    dataset: DatasetKind,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    dataset: DatasetArgs,
    /// Output file.
    #[arg(short, long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn print_report(report: &LoadReport) {
    eprintln!(
        "Loaded {} rows ({} parse issues, {} duplicates, {} without country, {} join misses)",
        report.rows,
        report.issues.len(),
        report.duplicates,
        report.dropped_empty_entity,
        report.join_misses.len()
    );
}

struct Ctx {
    cfg: VizConfig,
    fetcher: Fetcher,
}

impl Ctx {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let mut cfg = VizConfig::load_or_default(cli.config.as_ref())
            .with_context(|| format!("reading config {:?}", cli.config))?;
        if let Some(locale) = &cli.locale {
            cfg.locale = locale.clone();
        }
        let mut fetcher = Fetcher::default();
        if let Some(dir) = &cli.data_dir {
            fetcher = fetcher.with_base_dir(dir);
        }
        Ok(Self { cfg, fetcher })
    }

    fn long_table(&self, source: &str) -> Result<Dataset> {
        let text = self
            .fetcher
            .fetch_text(&Source::parse(source))
            .context("could not load data")?;
        let (ds, report) = loader::parse_long_csv(&text, Some(self.cfg.years))?;
        print_report(&report);
        Ok(ds)
    }

    fn dataset(&self, kind: DatasetKind) -> Result<Dataset> {
        match kind {
            DatasetKind::Sales => self.long_table(&self.cfg.data.sales),
            DatasetKind::OecdSales => self.long_table(&self.cfg.data.oecd_sales),
            DatasetKind::Incidence => {
                let text = self
                    .fetcher
                    .fetch_text(&Source::parse(&self.cfg.data.incidence))
                    .context("could not load data")?;
                let (ds, report) = loader::parse_wide_csv(&text, None)?;
                print_report(&report);
                Ok(ds)
            }
            DatasetKind::Merged => anyhow::bail!("merged records are not a single dataset"),
        }
    }
}

fn finish(app: &AppState, args: &RenderArgs) -> Result<()> {
    if let Some(font) = &args.font {
        bitmap::register_font_file(font)?;
    }
    render::save_scene(app.scene(), &args.out, &app.config().tooltip)
        .with_context(|| format!("writing {}", args.out.display()))?;
    eprintln!("Wrote {} to {}", app.scene().title, args.out.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let ctx = Ctx::from_cli(&cli)?;
    match cli.cmd {
        Command::Radar(args) => cmd_radar(&ctx, args),
        Command::Map(args) => cmd_map(&ctx, args),
        Command::Dual(args) => cmd_dual(ctx, args),
        Command::Stats(args) => cmd_stats(&ctx, args),
        Command::Export(args) => cmd_export(&ctx, args),
        Command::List(args) => cmd_list(&ctx, args),
    }
}

fn cmd_radar(ctx: &Ctx, args: RadarArgs) -> Result<()> {
    let (sales, report) =
        loader::load_sales(&ctx.fetcher, &ctx.cfg).context("could not load data")?;
    print_report(&report);
    let mut app = AppState::new(ChartData::Radar(sales), ctx.cfg.clone())?;
    let now = Instant::now();
    for value in args.select.as_deref().map(parse_list).unwrap_or_default() {
        app.handle(UiEvent::Toggle { value, checked: true }, now)?;
    }
    finish(&app, &args.render)
}

fn cmd_map(ctx: &Ctx, args: MapArgs) -> Result<()> {
    let (map, report) = loader::load_map(&ctx.fetcher, &ctx.cfg).context("could not load data")?;
    print_report(&report);
    let mut app = AppState::new(ChartData::Choropleth(map), ctx.cfg.clone())?;
    if let Some(year) = args.year {
        app.handle(UiEvent::Choose(year.to_string()), Instant::now())
            .with_context(|| format!("no incidence column for {year}"))?;
    }
    finish(&app, &args.render)
}

fn cmd_dual(mut ctx: Ctx, args: DualArgs) -> Result<()> {
    if let Some(domain) = args.domain {
        ctx.cfg.dual.domain = match domain {
            DomainArg::Active => DomainPolicy::Active,
            DomainArg::Global => DomainPolicy::Global,
        };
    }
    let (records, report) =
        loader::load_dual(&ctx.fetcher, &ctx.cfg).context("could not load data")?;
    print_report(&report);
    let mut app = AppState::new(ChartData::DualAxis(records), ctx.cfg.clone())?;
    if let Some(country) = args.country {
        app.handle(UiEvent::Choose(country.clone()), Instant::now())
            .with_context(|| format!("{country} is not in both tables"))?;
    }
    finish(&app, &args.render)
}

fn cmd_stats(ctx: &Ctx, args: DatasetArgs) -> Result<()> {
    let window = (args.dataset != DatasetKind::Incidence).then_some(ctx.cfg.years);
    let ds = ctx.dataset(args.dataset)?;
    for s in stats::entity_summary(&ds, window) {
        println!(
            "{}  count={} missing={}  min={} max={} mean={} median={}",
            s.entity,
            s.count,
            s.missing,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}

fn output_format(path: &Path, format: Option<&OutFormat>) -> String {
    match format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase()
}

fn cmd_export(ctx: &Ctx, args: ExportArgs) -> Result<()> {
    let path = &args.out;
    let fmt = output_format(path, args.format.as_ref());
    if args.dataset.dataset == DatasetKind::Merged {
        let (records, report) =
            loader::load_dual(&ctx.fetcher, &ctx.cfg).context("could not load data")?;
        print_report(&report);
        match fmt.as_str() {
            "csv" => storage::save_merged_csv(&records, path)?,
            "json" => storage::save_merged_json(&records, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} countries to {}", records.len(), path.display());
        return Ok(());
    }
    let ds = ctx.dataset(args.dataset.dataset)?;
    match fmt.as_str() {
        "csv" => storage::save_csv(&ds, path)?,
        "json" => storage::save_json(&ds, path)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} countries to {}", ds.len(), path.display());
    Ok(())
}

fn cmd_list(ctx: &Ctx, args: DatasetArgs) -> Result<()> {
    if args.dataset == DatasetKind::Merged {
        let (records, report) =
            loader::load_dual(&ctx.fetcher, &ctx.cfg).context("could not load data")?;
        print_report(&report);
        for r in &records {
            println!("{}", r.name());
        }
        return Ok(());
    }
    let ds = ctx.dataset(args.dataset)?;
    for name in ds.names() {
        println!("{name}");
    }
    let years = ds.years();
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        eprintln!("{} countries, years {first}-{last}", ds.len());
    }
    Ok(())
}
