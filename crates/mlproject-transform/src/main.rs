//! CLI entry point for the exam-score preprocessing stages.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use mlproject_transform::{
    DataIngestion, DataTransformation, HandleUnknown, IngestionConfig, NumericImputation,
    TransformationConfig, read_csv, write_csv,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// CLI-compatible unknown-category policy
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliHandleUnknown {
    /// Fail when the test split has a category unseen in train
    Error,
    /// Encode unseen categories as all zeros
    Ignore,
}

impl From<CliHandleUnknown> for HandleUnknown {
    fn from(cli: CliHandleUnknown) -> Self {
        match cli {
            CliHandleUnknown::Error => HandleUnknown::Error,
            CliHandleUnknown::Ignore => HandleUnknown::Ignore,
        }
    }
}

/// CLI-compatible numeric imputation strategy
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNumericImputation {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
}

impl From<CliNumericImputation> for NumericImputation {
    fn from(cli: CliNumericImputation) -> Self {
        match cli {
            CliNumericImputation::Mean => NumericImputation::Mean,
            CliNumericImputation::Median => NumericImputation::Median,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Preprocessing stages for the student exam-score dataset",
    long_about = "Splits the raw dataset, fits the preprocessing object and replays it on new data.\n\n\
                  EXAMPLES:\n  \
                  # Write artifacts/{data,train,test}.csv\n  \
                  mlproject-transform ingest -i notebook/data/stud.csv\n\n  \
                  # Fit on train, transform both splits, save artifacts/preprocessor.json\n  \
                  mlproject-transform transform --train artifacts/train.csv --test artifacts/test.csv\n\n  \
                  # Apply a saved preprocessor\n  \
                  mlproject-transform apply -p artifacts/preprocessor.json -i new.csv -o new_arr.csv"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy the source CSV into the artifacts dir and write a train/test split
    Ingest {
        /// Path to the source CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the raw copy and the splits
        #[arg(long, default_value = "artifacts")]
        artifacts_dir: PathBuf,

        /// Fraction of rows assigned to the test split
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Seed for the row shuffle
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Fit the preprocessor on train, transform both splits and save it
    Transform {
        /// Training split CSV
        #[arg(long)]
        train: PathBuf,

        /// Test split CSV
        #[arg(long)]
        test: PathBuf,

        /// Directory the preprocessor (and arrays) are written to
        #[arg(long, default_value = "artifacts")]
        artifacts_dir: PathBuf,

        /// Target column appended to the transformed arrays
        #[arg(short, long, default_value = "math_score")]
        target: String,

        /// Strategy for imputing missing numeric values
        #[arg(long, value_enum, default_value = "median")]
        numeric_imputation: CliNumericImputation,

        /// What to do with categories unseen during fit
        #[arg(long, value_enum, default_value = "error")]
        handle_unknown: CliHandleUnknown,

        /// Also write train_arr.csv and test_arr.csv to the artifacts dir
        #[arg(long)]
        write_arrays: bool,
    },

    /// Apply a saved preprocessor to a CSV file
    Apply {
        /// Saved preprocessor JSON
        #[arg(short, long)]
        preprocessor: PathBuf,

        /// CSV with the feature columns
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the transformed features
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables (e.g. RUST_LOG) from .env file
    dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    match args.command {
        Command::Ingest {
            input,
            artifacts_dir,
            test_size,
            seed,
        } => run_ingest(&input, artifacts_dir, test_size, seed),
        Command::Transform {
            train,
            test,
            artifacts_dir,
            target,
            numeric_imputation,
            handle_unknown,
            write_arrays,
        } => {
            let config = TransformationConfig::builder()
                .artifacts_dir(artifacts_dir)
                .target_column(target)
                .numeric_imputation(numeric_imputation.into())
                .handle_unknown(handle_unknown.into())
                .build()?;
            run_transform(config, &train, &test, write_arrays)
        }
        Command::Apply {
            preprocessor,
            input,
            output,
        } => run_apply(&preprocessor, &input, &output),
    }
}

fn run_ingest(input: &Path, artifacts_dir: PathBuf, test_size: f64, seed: u64) -> Result<()> {
    ensure_exists(input)?;

    let config = IngestionConfig::builder()
        .artifacts_dir(artifacts_dir)
        .test_size(test_size)
        .seed(seed)
        .build()?;

    let output = DataIngestion::with_config(config).initiate_data_ingestion(input)?;

    println!("Train split: {}", output.train_path.display());
    println!("Test split:  {}", output.test_path.display());
    Ok(())
}

fn run_transform(
    config: TransformationConfig,
    train: &Path,
    test: &Path,
    write_arrays: bool,
) -> Result<()> {
    ensure_exists(train)?;
    ensure_exists(test)?;

    let artifacts_dir = config.artifacts_dir.clone();
    let mut output = DataTransformation::with_config(config).initiate_data_transformation(train, test)?;

    if write_arrays {
        let train_out = artifacts_dir.join("train_arr.csv");
        let test_out = artifacts_dir.join("test_arr.csv");
        write_csv(&train_out, &mut output.train_arr)?;
        write_csv(&test_out, &mut output.test_arr)?;
        info!("Arrays written to {}", artifacts_dir.display());
    }

    println!("Train array: {:?}", output.train_arr.shape());
    println!("Test array:  {:?}", output.test_arr.shape());
    println!("Preprocessor: {}", output.preprocessor_path.display());
    Ok(())
}

fn run_apply(preprocessor: &Path, input: &Path, output: &Path) -> Result<()> {
    ensure_exists(preprocessor)?;
    ensure_exists(input)?;

    let features = read_csv(input)?;
    info!("Loaded {} rows from {}", features.height(), input.display());

    let mut transformed = DataTransformation::transform_with_saved(preprocessor, &features)?;
    write_csv(output, &mut transformed)?;

    println!(
        "Wrote {:?} transformed features to {}",
        transformed.shape(),
        output.display()
    );
    Ok(())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    Ok(())
}
