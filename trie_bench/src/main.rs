#![doc = include_str!("../README.md")]

use std::hint::black_box;
use std::io::{self, BufRead};

use clap::{Parser, ValueEnum};
use cpu_time::ProcessTime;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use succinct_tries::{Trie, LevelTrie, FlatTrie, Patricia, Indirect, TSTree, NOT_FOUND};

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Variant {
    Level,
    Flat,
    Patricia,
    Indirect,
    Tstree,
    All,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Builds and times succinct trie variants over a sorted key set read from standard input.
pub struct Conf {
    /// Trie variant(s) to benchmark.
    #[arg(short = 't', long, value_enum, default_value_t = Variant::All)]
    trie: Variant,

    /// Seed for shuffling keys and ids before the shuffled-order passes.
    #[arg(long, default_value_t = 1234)]
    seed: u64,
}

/// Formats `v` with thousands separators, e.g. `1234567` -> `"1,234,567"`.
fn uint_str(v: u64) -> String {
    let digits = v.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        out.push(c);
        let remaining = len - i - 1;
        if remaining != 0 && remaining % 3 == 0 { out.push(','); }
    }
    out
}

fn read_keys() -> Vec<Vec<u8>> {
    println!("keys:");
    let stdin = io::stdin();
    let mut keys = Vec::new();
    let (mut sum, mut min_len, mut max_len) = (0u64, u64::MAX, 0u64);
    for line in stdin.lock().lines() {
        let line = line.expect("failed to read a key line from standard input");
        let len = line.len() as u64;
        sum += len;
        min_len = min_len.min(len);
        max_len = max_len.max(len);
        keys.push(line.into_bytes());
    }
    assert!(!keys.is_empty(), "no keys read from standard input");
    println!(" #keys: {}", uint_str(keys.len() as u64));
    let avg = sum as f64 / keys.len() as f64;
    println!(" size: {} bytes ({avg:.3} bytes/key in range [{min_len}, {max_len}])", uint_str(sum));
    keys
}

fn sort_and_uniquify(keys: &mut Vec<Vec<u8>>) {
    keys.sort();
    keys.dedup();
    println!("unique_keys:");
    let sum: u64 = keys.iter().map(|k| k.len() as u64).sum();
    println!(" #keys: {} bytes", uint_str(keys.len() as u64));
    let avg = sum as f64 / keys.len() as f64;
    println!(" size: {} bytes ({avg:.3} bytes/key)", uint_str(sum));
}

fn eval<T: Trie>(keys: &[Vec<u8>], shuffled_keys: &[Vec<u8>], shuffled_ids: &[u64]) {
    let n = keys.len() as f64;

    let begin = ProcessTime::now();
    let trie = T::build(keys);
    let elapsed = begin.elapsed().as_secs_f64();
    println!("{}:", trie.name());
    println!(" size: {} bytes ({:.3} bytes/key)", uint_str(trie.size() as u64), trie.size() as f64 / n);
    println!(" build: elapsed = {elapsed:.3} s ({:.3} ns/key)", elapsed * 1e9 / n);

    let begin = ProcessTime::now();
    let mut pairs: Vec<(u64, &Vec<u8>)> = keys.iter().map(|k| {
        let id = trie.lookup(k);
        assert_ne!(id, NOT_FOUND, "key not found during validation");
        (id, k)
    }).collect();
    pairs.sort_by_key(|&(id, _)| id);
    for (expected_id, (id, _)) in pairs.iter().enumerate() {
        assert_eq!(expected_id as u64, *id, "lookup ids are not a permutation of 0..n");
    }
    let mut key_buf = Vec::new();
    for &(id, key) in &pairs {
        trie.reverse_lookup(id, &mut key_buf);
        assert_eq!(&key_buf, key, "reverse_lookup did not invert lookup");
    }
    let elapsed = begin.elapsed().as_secs_f64();
    println!(" validation: {elapsed:.3} s ({:.3} ns/key)", elapsed * 1e9 / n);

    let begin = ProcessTime::now();
    for key in keys { black_box(trie.lookup(key)); }
    let elapsed = begin.elapsed().as_secs_f64();
    println!(" lookup (sorted): {elapsed:.3} s ({:.3} ns/key)", elapsed * 1e9 / n);

    let begin = ProcessTime::now();
    for key in shuffled_keys { black_box(trie.lookup(key)); }
    let elapsed = begin.elapsed().as_secs_f64();
    println!(" lookup (shuffled): {elapsed:.3} s ({:.3} ns/key)", elapsed * 1e9 / n);

    let begin = ProcessTime::now();
    for id in 0..keys.len() as u64 {
        trie.reverse_lookup(id, &mut key_buf);
        black_box(&key_buf);
    }
    let elapsed = begin.elapsed().as_secs_f64();
    println!(" reverse_lookup (sorted): {elapsed:.3} s ({:.3} ns/key)", elapsed * 1e9 / n);

    let begin = ProcessTime::now();
    for &id in shuffled_ids {
        trie.reverse_lookup(id, &mut key_buf);
        black_box(&key_buf);
    }
    let elapsed = begin.elapsed().as_secs_f64();
    println!(" reverse_lookup (shuffled): {elapsed:.3} s ({:.3} ns/key)", elapsed * 1e9 / n);
}

fn run(conf: &Conf) {
    let mut keys = read_keys();
    sort_and_uniquify(&mut keys);

    let mut rng = Pcg64Mcg::seed_from_u64(conf.seed);
    let mut shuffled_keys = keys.clone();
    shuffled_keys.shuffle(&mut rng);
    let mut shuffled_ids: Vec<u64> = (0..keys.len() as u64).collect();
    shuffled_ids.shuffle(&mut rng);

    let variants = if conf.trie == Variant::All {
        vec![Variant::Level, Variant::Flat, Variant::Patricia, Variant::Indirect, Variant::Tstree]
    } else {
        vec![conf.trie]
    };
    for variant in variants {
        match variant {
            Variant::Level => eval::<LevelTrie>(&keys, &shuffled_keys, &shuffled_ids),
            Variant::Flat => eval::<FlatTrie>(&keys, &shuffled_keys, &shuffled_ids),
            Variant::Patricia => eval::<Patricia>(&keys, &shuffled_keys, &shuffled_ids),
            Variant::Indirect => eval::<Indirect>(&keys, &shuffled_keys, &shuffled_ids),
            Variant::Tstree => eval::<TSTree>(&keys, &shuffled_keys, &shuffled_ids),
            Variant::All => unreachable!("expanded above"),
        }
    }
}

fn main() {
    let conf = Conf::parse();
    run(&conf);
}
