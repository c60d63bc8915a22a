//! globvar
//!
//! 由配置工作簿生成 ISPSoft 全局变量表与 HMI 标签表，并比较两次生成结果。

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use globvar_core::compare::{
    check_consistency, CompareKey, CompareOptions, ConsistencyReport, HmiDiffSource, TablePair,
};
use globvar_core::{CsvTableSink, GeneratorConfig, GeneratorService, XlsxWorkbook};

const DEFAULT_WORKBOOK: &str = "global_variable_template.xlsx";

#[derive(Parser, Debug)]
#[command(name = "globvar", version, about = "ISPSoft global variable / HMI tag table generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 读取工作簿，输出两张 CSV 表
    Generate(GenerateArgs),
    /// 比较两组已生成的表（两个目录，或四个文件：旧 PLC 新 PLC 旧 HMI 新 HMI）
    Compare(CompareArgs),
    /// 分别由新旧工作簿生成后比较
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long, default_value = DEFAULT_WORKBOOK)]
    workbook: PathBuf,
    /// JSON 配置文件；不存在时使用默认配置
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// 只比较变量名
    #[arg(long)]
    by_name: bool,
    /// HMI 结果沿用 PLC 表的比较结果
    #[arg(long)]
    hmi_from_plc: bool,
}

impl KeyArgs {
    fn options(&self) -> CompareOptions {
        CompareOptions {
            key: if self.by_name {
                CompareKey::NameOnly
            } else {
                CompareKey::WholeRow
            },
            hmi_source: if self.hmi_from_plc {
                HmiDiffSource::PlcTables
            } else {
                HmiDiffSource::HmiTables
            },
        }
    }
}

#[derive(Args, Debug)]
struct CompareArgs {
    #[arg(required = true, num_args = 2..=4)]
    paths: Vec<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    keys: KeyArgs,
}

#[derive(Args, Debug)]
struct CheckArgs {
    old_workbook: PathBuf,
    new_workbook: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    #[command(flatten)]
    keys: KeyArgs,
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(p) => GeneratorConfig::load_from_file(p),
        None => Ok(GeneratorConfig::default()),
    }
}

fn generate_to(workbook: &Path, config: &GeneratorConfig, sink: &mut CsvTableSink) -> Result<()> {
    let source = XlsxWorkbook::open(workbook)?;
    let mut service = GeneratorService::new(source, config.clone());
    service
        .generate_into(sink)
        .with_context(|| format!("generation failed for {}", workbook.display()))?;
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut sink = CsvTableSink::in_dir(&args.out_dir, &config);
    generate_to(&args.workbook, &config, &mut sink)
}

fn print_report(report: &ConsistencyReport) {
    println!("{report}");
    if !report.is_consistent() {
        info!(
            "differences: {} global variable rows, {} HMI tag rows",
            report.plc.len(),
            report.hmi.len()
        );
    }
}

/// 两个目录（按配置中的文件名取表），或四个文件：旧 PLC 新 PLC 旧 HMI 新 HMI
fn load_compare_inputs(paths: &[PathBuf], config: Option<&Path>) -> Result<(TablePair, TablePair)> {
    match paths {
        [old_dir, new_dir] => {
            let config = load_config(config)?;
            let old = CsvTableSink::in_dir(old_dir, &config);
            let new = CsvTableSink::in_dir(new_dir, &config);
            Ok((
                TablePair::load(old.global_path(), old.hmi_path())?,
                TablePair::load(new.global_path(), new.hmi_path())?,
            ))
        }
        [old_plc, new_plc, old_hmi, new_hmi] => Ok((
            TablePair::load(old_plc, old_hmi)?,
            TablePair::load(new_plc, new_hmi)?,
        )),
        other => bail!(
            "expected two directories or four files, got {} paths",
            other.len()
        ),
    }
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let (old, new) = load_compare_inputs(&args.paths, args.config.as_deref())?;
    let report = check_consistency(&old, &new, args.keys.options())?;
    print_report(&report);
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut old_sink = CsvTableSink::in_dir_with_prefix(&args.out_dir, &config, "old_");
    let mut new_sink = CsvTableSink::in_dir_with_prefix(&args.out_dir, &config, "new_");

    generate_to(&args.old_workbook, &config, &mut old_sink)?;
    generate_to(&args.new_workbook, &config, &mut new_sink)?;

    let old = TablePair::load(old_sink.global_path(), old_sink.hmi_path())?;
    let new = TablePair::load(new_sink.global_path(), new_sink.hmi_path())?;
    let report = check_consistency(&old, &new, args.keys.options())?;
    print_report(&report);
    Ok(())
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Compare(args) => run_compare(args),
        Commands::Check(args) => run_check(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
