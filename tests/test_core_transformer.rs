use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::{DataFrame, SessionContext};

use tabprep::exceptions::{TabPrepError, TabPrepResult};
use tabprep::splitting::DataSplitter;
use tabprep::transformer::Transformer;
use tabprep::transformers::categorical_encoding::{
    Categories, CategoricalEncoder, EncodingMethod,
};
use tabprep::transformers::outlier_handling::OutlierHandler;

/// Ten rows with a categorical "region" column, a numeric "price" feature and a "target".
async fn create_df() -> DataFrame {
    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("price", DataType::Float64, false),
        Field::new("target", DataType::Float64, false),
    ]));
    let region: ArrayRef = Arc::new(StringArray::from(vec![
        "north", "south", "north", "east", "south", "north", "east", "south", "north", "east",
    ]));
    let price: ArrayRef = Arc::new(Float64Array::from(vec![
        10.0, 11.0, 12.0, 13.0, 14.0, 10.5, 11.5, 12.5, 500.0, 13.5,
    ]));
    let target: ArrayRef = Arc::new(Float64Array::from(
        (0..10).map(|i| i as f64).collect::<Vec<f64>>(),
    ));
    let batch = RecordBatch::try_new(schema.clone(), vec![region, price, target]).unwrap();
    let mem_table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
    let ctx = SessionContext::new();
    ctx.register_table("sales", Arc::new(mem_table)).unwrap();
    ctx.table("sales").await.unwrap()
}

#[tokio::test]
async fn test_transformers_behind_trait_objects() -> TabPrepResult<()> {
    let df = create_df().await;
    let mut steps: Vec<(Box<dyn Transformer + Send + Sync>, Vec<String>)> = vec![
        (
            Box::new(OutlierHandler::default()),
            vec!["price".to_string()],
        ),
        (
            Box::new(CategoricalEncoder::new(
                EncodingMethod::OneHot,
                Categories::Auto,
            )),
            vec!["region".to_string()],
        ),
    ];

    let mut current = df;
    for (step, columns) in steps.iter_mut() {
        current = step.fit_transform(current, columns).await?;
        assert!(columns.iter().all(|c| step.is_fitted(c)));
    }

    let batches = current.clone().collect().await?;
    let batch = concat_batches(&batches[0].schema(), &batches)?;
    let names: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(
        names,
        vec![
            "price",
            "target",
            "region_east",
            "region_north",
            "region_south"
        ]
    );
    let price = batch
        .column(0)
        .as_any()
        .downcast_ref::<Float64Array>()
        .expect("Expected Float64Array");
    assert!(price.values().iter().all(|v| *v < 100.0));

    let features = vec![
        "price".to_string(),
        "region_east".to_string(),
        "region_north".to_string(),
        "region_south".to_string(),
    ];
    let split = DataSplitter::new(features, "target").split(&current).await?;
    let x_test = split.x_test.collect().await?;
    let test_rows: usize = x_test.iter().map(RecordBatch::num_rows).sum();
    assert_eq!(test_rows, 2);
    Ok(())
}

#[tokio::test]
async fn test_trait_transform_requires_fit() -> TabPrepResult<()> {
    let df = create_df().await;
    let mut steps: Vec<Box<dyn Transformer + Send + Sync>> = vec![
        Box::new(OutlierHandler::default()),
        Box::new(CategoricalEncoder::default()),
    ];
    for step in steps.iter_mut() {
        let result = step.transform(df.clone(), &["price".to_string()]).await;
        assert!(matches!(result, Err(TabPrepError::NotFitted(_))));
    }
    Ok(())
}
