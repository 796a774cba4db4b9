use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ndarray::{Array1, Array2};

use xrspec::binning::{find_minimum_threshold, group_counts, group_counts_batch};
use xrspec::data::{edges_to_intervals, Exposure, LoadedSpectrum, SampleDistribution, SpectrumExtras};
use xrspec::{CollectionConfig, SpectrumCollection};

/// A falling power law over `n` unit-width channels.
fn power_law(n: usize) -> (Array2<f64>, Array1<f64>) {
    let edges: Array1<f64> = (0..=n).map(|e| 3.0 + e as f64 * 0.04).collect();
    let bins = edges_to_intervals(edges.view());
    let counts = bins
        .rows()
        .into_iter()
        .map(|row| (5.0e4 * row[0].powf(-3.0)).floor())
        .collect();
    (bins, counts)
}

fn grouping(c: &mut Criterion) {
    let (bins, counts) = power_law(1024);

    c.bench_function("group_counts_1024", |b| {
        b.iter(|| group_counts(black_box(bins.view()), black_box(counts.view()), Some(20)))
    });

    c.bench_function("find_minimum_threshold_1024", |b| {
        b.iter(|| find_minimum_threshold(black_box(bins.view()), black_box(counts.view()), 1))
    });

    let spectra: Vec<_> = (0..16).map(|_| (bins.view(), counts.view())).collect();
    c.bench_function("group_counts_batch_16x1024", |b| {
        b.iter(|| group_counts_batch(black_box(&spectra), Some(20)))
    });
}

fn collection_rebin(c: &mut Criterion) {
    let (bins, counts) = power_law(512);
    let n = counts.len();
    let loaded = LoadedSpectrum {
        counts_error: counts.mapv(f64::sqrt),
        counts: counts.clone(),
        count_channel_bins: bins.clone(),
        photon_channel_bins: bins,
        response_matrix: Array2::eye(n),
        effective_exposure: Exposure::Scalar(10.0),
        sample_distribution: SampleDistribution::Poissonian,
        extras: SpectrumExtras::default(),
    };

    for (name, config) in [
        ("collection_rebin_sequential", CollectionConfig::default()),
        ("collection_rebin_parallel", CollectionConfig::parallel()),
    ] {
        let mut collection = SpectrumCollection::new(config);
        for _ in 0..8 {
            collection.push_loaded(loaded.clone()).unwrap();
        }
        c.bench_function(name, |b| b.iter(|| collection.rebin(black_box(20_i64))));
    }
}

criterion_group!(benches, grouping, collection_rebin);
criterion_main!(benches);
