//! Benchmark suite for the TGR line codec
//!
//! Measures line encoding, line decoding and whole-file decoding over
//! synthetic sprite-shaped data.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use std::hint::black_box;
use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tgr_benches::{generate_row, generate_test_file, sizes, test_player_colors};
use tgr_types::file::TgrFile;
use tgr_types::file::tgr::{ColorMode, Line, LineDecoder, LineEncoder};

fn bench_encode_line(c: &mut Criterion) {
	let colors = test_player_colors(2);
	let shades = colors.player(2);
	let mut group = c.benchmark_group("encode_line");

	for &(width, _) in &[sizes::PORTRAIT, sizes::UNIT, sizes::BUILDING] {
		let rows: Vec<Vec<_>> =
			(0..32).map(|seed| generate_row(usize::from(width), seed, shades)).collect();
		let encoder = LineEncoder::new(shades);

		group.throughput(Throughput::Elements(u64::from(width) * rows.len() as u64));
		group.bench_with_input(BenchmarkId::new("width", width), &rows, |b, rows| {
			b.iter(|| {
				for row in rows {
					let packed = encoder.encode_line(black_box(row)).unwrap();
					black_box(packed);
				}
			});
		});
	}

	group.finish();
}

fn bench_decode_line(c: &mut Criterion) {
	let colors = test_player_colors(2);
	let shades = colors.player(2);
	let mut group = c.benchmark_group("decode_line");

	for &(width, _) in &[sizes::PORTRAIT, sizes::UNIT, sizes::BUILDING] {
		let encoder = LineEncoder::new(shades);
		let packed: Vec<Vec<u8>> = (0..32)
			.map(|seed| {
				encoder.encode_line(&generate_row(usize::from(width), seed, shades)).unwrap()
			})
			.collect();
		let decoder = LineDecoder::new(ColorMode::Rgb565, None, shades, 2).unwrap();

		group.throughput(Throughput::Elements(u64::from(width) * packed.len() as u64));
		group.bench_with_input(BenchmarkId::new("width", width), &packed, |b, packed| {
			b.iter(|| {
				for bytes in packed {
					let mut cursor = Cursor::new(bytes.as_slice());
					let line = Line::from_reader(&mut cursor).unwrap();
					let pixels = decoder.decode_line(&mut cursor, &line).unwrap();
					black_box(pixels);
				}
			});
		});
	}

	group.finish();
}

fn bench_decode_file(c: &mut Criterion) {
	let colors = test_player_colors(2);
	let mut group = c.benchmark_group("decode_file");

	for (name, (width, height)) in
		[("portrait", sizes::PORTRAIT), ("unit", sizes::UNIT), ("building", sizes::BUILDING)]
	{
		let data = generate_test_file(width, height, 4);
		group.throughput(Throughput::Elements(u64::from(width) * u64::from(height) * 4));
		group.bench_with_input(BenchmarkId::new("decode", name), &data, |b, data| {
			b.iter(|| {
				let file = TgrFile::from_bytes(black_box(data)).unwrap();
				for index in 0..file.frame_count() {
					let image = file.decode_frame(index, &colors, 2).unwrap();
					black_box(image);
				}
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_encode_line, bench_decode_line, bench_decode_file);
criterion_main!(benches);
