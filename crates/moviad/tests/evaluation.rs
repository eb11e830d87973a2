use approx::assert_relative_eq;
use burn::backend::NdArray;
use moviad::{
    metric::{
        EvalMetric, Evaluator, Metric, MetricLevel, OverlapAveraging, ProAucConfig, RocAuc,
    },
    quant::{
        compute_product_quantization_efficiency, compute_quantizer_config_size,
        ProductQuantizerConfig, Quantizer,
    },
    synthetic::{random_coreset, SyntheticBatch},
};

type B = NdArray;

#[test]
fn default_evaluation_of_synthetic_batch() {
    let data = SyntheticBatch::<B>::generate(8, 32, 42, &Default::default());

    let report = Evaluator::default()
        .evaluate(data.image_gt, data.image_pred, data.pixel_gt, data.pixel_pred)
        .unwrap();

    assert_eq!(report.len(), 7);
    assert_relative_eq!(report.scalar("img_roc_auc").unwrap(), 1.0);
    for (name, value) in report.iter() {
        let value = value.as_scalar().unwrap();
        assert!((0.0..=1.0).contains(&value), "{name} = {value}");
    }
    assert!(report.to_string().lines().all(|line| line.contains(": ")));
}

#[test]
fn evaluator_matches_individual_metrics() {
    let data = SyntheticBatch::<B>::generate(6, 16, 7, &Default::default());

    let direct = RocAuc::new(MetricLevel::Pixel)
        .compute(data.pixel_gt.clone(), data.pixel_pred.clone())
        .unwrap();
    let report = Evaluator::new(vec![EvalMetric::from(RocAuc::new(MetricLevel::Pixel))])
        .evaluate(data.image_gt, data.image_pred, data.pixel_gt, data.pixel_pred)
        .unwrap();

    assert_eq!(report.scalar("pxl_roc_auc"), Some(direct));
}

#[test]
fn pro_auc_averaging_modes_agree_on_single_defect_images() {
    // One defect per anomalous image makes both poolings weigh regions equally.
    let data = SyntheticBatch::<B>::generate(6, 16, 3, &Default::default());

    let per_image = ProAucConfig::new()
        .init(MetricLevel::Pixel)
        .unwrap()
        .compute(data.pixel_gt.clone(), data.pixel_pred.clone())
        .unwrap();
    let per_region = ProAucConfig::new()
        .with_overlap_averaging(OverlapAveraging::PerRegion)
        .init(MetricLevel::Pixel)
        .unwrap()
        .compute(data.pixel_gt, data.pixel_pred)
        .unwrap();

    assert_relative_eq!(per_image, per_region, epsilon = 1e-12);
}

#[test]
fn quantized_coreset_report() {
    let device = Default::default();
    let coreset = random_coreset::<B>(1024, 32, 1, &device);

    let quantizer = ProductQuantizerConfig::new(4, 64).init(coreset.clone()).unwrap();
    let codes = quantizer.encode(coreset.clone()).unwrap();
    let report = compute_product_quantization_efficiency(coreset, &codes, &quantizer).unwrap();

    assert_eq!(quantizer.centroids().dims(), [4, 64, 8]);
    assert_eq!(compute_quantizer_config_size(&quantizer), 4 * 64 * 8 * 4 + 8);
    // original 4 * 32768 * 8 bits, compressed (4096 + 8200) * 8 bits
    assert_relative_eq!(report.efficiency, 1.0 - 98_368.0 / 1_048_576.0, epsilon = 1e-12);
    assert!(report.distortion > 0.0 && report.distortion < 0.5);
}
