extern crate conllx;
extern crate env_logger;
extern crate getopts;
extern crate itertools;
extern crate stdinout;
extern crate tpar;
#[macro_use]
extern crate tpar_utils;

use std::collections::HashMap;
use std::env::args;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::process;

use conllx::ReadSentence;
use getopts::Options;
use itertools::Itertools;
use stdinout::Output;
use tpar::driver::GoldDriver;
use tpar::lexicon::LexiconCache;

use tpar_utils::{
    write_oracle_record, Config, ConllxSource, FileProgress, OracleRecord, OrExit, Result,
    TomlRead,
};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options] CONFIG [OUTPUT]", program);
    print!("{}", opts.usage(&brief));
}

fn main() {
    env_logger::init();

    let args: Vec<String> = args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    let matches = opts.parse(&args[1..]).or_exit();

    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }

    if matches.free.is_empty() || matches.free.len() > 2 {
        print_usage(&program, opts);
        process::exit(1);
    }

    let config_file = File::open(&matches.free[0]).or_exit();
    let mut config = Config::from_toml_read(config_file).or_exit();
    config.relativize_paths(&matches.free[0]).or_exit();

    stderr!("Reading corpus...");
    let n_sentences = count_sentences(&config).or_exit();
    stderr!("{} sentences in {}", n_sentences, config.corpora.train);

    let output = matches.free.get(1).map(|path| Output::from(Some(path)));
    let writer = output
        .as_ref()
        .map(|output| BufWriter::new(output.write().or_exit()));

    generate(&config, writer).or_exit();
}

fn count_sentences(config: &Config) -> Result<usize> {
    let file = File::open(&config.corpora.train)?;
    let reader = conllx::Reader::new(BufReader::new(FileProgress::new(file)?));

    let mut n_sentences = 0;
    for sentence in reader.sentences() {
        sentence?;
        n_sentences += 1;
    }

    Ok(n_sentences)
}

/// Run the gold driver for one epoch, writing an oracle record per step.
fn generate<W>(config: &Config, mut writer: Option<W>) -> Result<()>
where
    W: Write,
{
    let context = config.to_task_context();
    let lexicons = LexiconCache::new();

    let mut source = ConllxSource::open(&config.corpora.train)?;
    if config.parser.pproj {
        source = source.with_projectivization();
    }

    let driver = GoldDriver::new(
        &context,
        &config.parser.arg_prefix,
        config.parser.batch_size,
        config.num_feature_groups(),
        &lexicons,
        Box::new(source),
    )?;

    let mut n_steps = 0;
    let mut action_counts: HashMap<usize, usize> = HashMap::new();

    loop {
        let step = driver.step()?;
        if step.epochs > 0 {
            break;
        }

        n_steps += 1;
        for &action in &step.gold_actions {
            *action_counts.entry(action).or_insert(0) += 1;
        }

        if let Some(ref mut writer) = writer {
            write_oracle_record(
                writer,
                &OracleRecord {
                    features: &step.features,
                    gold_actions: &step.gold_actions,
                },
            )?;
        }
    }

    stderr!(
        "{} steps, {} transitions",
        n_steps,
        action_counts.values().sum::<usize>()
    );
    for (action, count) in action_counts.into_iter().sorted() {
        stderr!("transition {}: {}", action, count);
    }

    Ok(())
}
