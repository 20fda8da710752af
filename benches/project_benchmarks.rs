use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use datafusion::prelude::{DataFrame, SessionContext};
use tokio::runtime::Runtime;

use tabprep::transformers::categorical_encoding::{
    Categories, CategoricalEncoder, EncodingMethod,
};
use tabprep::transformers::outlier_handling::OutlierHandler;

const N_ROWS: usize = 10_000;

fn create_df() -> DataFrame {
    let schema = Arc::new(Schema::new(vec![
        Field::new("category", DataType::Utf8, false),
        Field::new("value", DataType::Float64, false),
    ]));
    let labels = ["a", "b", "c", "d", "e"];
    let category: ArrayRef = Arc::new(StringArray::from(
        (0..N_ROWS).map(|i| labels[i % labels.len()]).collect::<Vec<_>>(),
    ));
    let value: ArrayRef = Arc::new(Float64Array::from(
        (0..N_ROWS)
            .map(|i| if i % 97 == 0 { 1_000.0 } else { (i % 100) as f64 })
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(schema, vec![category, value]).unwrap();
    SessionContext::new().read_batch(batch).unwrap()
}

fn bench_categorical_encoder(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let df = create_df();
    let columns = vec!["category".to_string()];

    for method in [EncodingMethod::OneHot, EncodingMethod::Ordinal] {
        c.bench_function(&format!("categorical_encoder_{}", method), |b| {
            b.iter(|| {
                rt.block_on(async {
                    let mut encoder = CategoricalEncoder::new(method, Categories::Auto);
                    let out = encoder.fit_transform(df.clone(), &columns).await.unwrap();
                    black_box(out.collect().await.unwrap())
                })
            })
        });
    }
}

fn bench_outlier_handler(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let df = create_df();
    let columns = vec!["value".to_string()];

    c.bench_function("outlier_handler_fit_transform", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut handler = OutlierHandler::default();
                let out = handler.fit_transform(df.clone(), &columns).await.unwrap();
                black_box(out.collect().await.unwrap())
            })
        })
    });
}

criterion_group!(benches, bench_categorical_encoder, bench_outlier_handler);
criterion_main!(benches);
