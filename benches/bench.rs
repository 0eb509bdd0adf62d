// Criterion benchmarks for Estate Engine

use chrono::NaiveTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use estate_engine::core::{
    Coordinate, EstateSearchCriteria, FeatureDefaults, FeatureField, FeatureVectorAssembler,
    FilterPredicateBuilder, PartialFeatures, PriceModel, RawPayload, RequestNormalizer, ResultPager,
    TreeEnsembleModel, MONETARY_UNIT,
};
use estate_engine::models::Estate;
use serde_json::json;

const PRICE_MODEL: &str = r#"{
    "learner": {
        "learner_model_param": {"base_score": "[3E0]", "num_feature": "13"},
        "gradient_booster": {
            "model": {
                "trees": [
                    {
                        "left_children": [1, 3, 5, -1, -1, -1, -1],
                        "right_children": [2, 4, 6, -1, -1, -1, -1],
                        "split_indices": [7, 6, 0, 0, 0, 0, 0],
                        "split_conditions": [60.0, 2.0, 55.8, -0.8, -0.2, 0.4, 1.6],
                        "default_left": [1, 1, 0, 0, 0, 0, 0]
                    },
                    {
                        "left_children": [1, -1, -1],
                        "right_children": [2, -1, -1],
                        "split_indices": [10, 0, 0],
                        "split_conditions": [2018.0, -0.3, 0.3],
                        "default_left": [0, 0, 0]
                    }
                ]
            }
        }
    }
}"#;

fn create_estate(id: usize) -> Estate {
    Estate {
        estate_id: id as i32,
        price: 2.0 + (id % 40) as f64 * 0.5,
        year: 2018 + (id % 4) as i32,
        month: 1 + (id % 12) as i32,
        day: 1 + (id % 28) as i32,
        time: NaiveTime::from_hms_opt((id % 24) as u32, 0, 0),
        latitude: 55.5 + (id as f64 * 0.001) % 0.5,
        longitude: 37.3 + (id as f64 * 0.001) % 0.5,
        region: Some(81),
        building_type: Some((id % 6) as i32),
        level: Some(1 + (id % 20) as i32),
        levels: Some(20),
        rooms: Some(1 + (id % 4) as i32),
        area: Some(30.0 + (id % 70) as f64),
        kitchen_area: Some(8.0),
        object_type: Some(1),
        address: None,
        region_name: None,
        user_id: None,
    }
}

fn search_payload() -> RawPayload {
    json!({
        "priceFrom": "1000000",
        "priceTo": 15000000,
        "totalAreaFrom": 56.5,
        "totalAreaTo": 80.5,
        "houseType": 2,
        "objectType": -1,
        "numberOfRoomsFrom": 2
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

fn bench_predicate_build(c: &mut Criterion) {
    let raw = search_payload();
    let builder = FilterPredicateBuilder::default();
    let coordinate = Some(Coordinate::new(55.75, 37.61));

    c.bench_function("search_predicate_from_payload", |b| {
        b.iter(|| {
            let criteria = EstateSearchCriteria::from_request(&RequestNormalizer::new(black_box(&raw)), MONETARY_UNIT)
                .map(|criteria| criteria.with_coordinate(coordinate));
            criteria.map(|criteria| builder.build(&criteria))
        });
    });
}

fn bench_assemble_and_score(c: &mut Criterion) {
    let defaults = FeatureDefaults::historical();
    let assembler = FeatureVectorAssembler::new(&defaults);
    let model = match TreeEnsembleModel::from_json_str(PRICE_MODEL) {
        Ok(model) => model,
        Err(e) => panic!("benchmark model is invalid: {}", e),
    };
    let partial = PartialFeatures::default()
        .with(FeatureField::Area, 64.0)
        .with(FeatureField::Rooms, 2.0);
    let coordinate = Coordinate::new(55.75, 37.61);

    c.bench_function("assemble_feature_vector", |b| {
        b.iter(|| assembler.assemble(black_box(&partial), black_box(coordinate)));
    });

    let vector = assembler.assemble(&partial, coordinate);
    c.bench_function("tree_ensemble_score", |b| {
        b.iter(|| model.score(black_box(&vector)));
    });
}

fn bench_filter_and_paginate(c: &mut Criterion) {
    let raw = search_payload();
    let predicate = match EstateSearchCriteria::from_request(&RequestNormalizer::new(&raw), MONETARY_UNIT) {
        Ok(criteria) => FilterPredicateBuilder::default().build(&criteria.with_coordinate(Some(Coordinate::new(55.75, 37.61)))),
        Err(e) => panic!("benchmark payload is invalid: {}", e),
    };
    let pager = ResultPager::default();

    let mut group = c.benchmark_group("filter_and_paginate");

    for listing_count in [100, 1000, 10000].iter() {
        let listings: Vec<Estate> = (0..*listing_count).map(create_estate).collect();

        group.bench_with_input(
            BenchmarkId::new("in_memory", listing_count),
            listing_count,
            |b, _| {
                b.iter(|| {
                    let matched: Vec<Estate> = listings
                        .iter()
                        .filter(|e| predicate.matches(e))
                        .cloned()
                        .collect();
                    pager.paginate(black_box(matched), pager.page_request(Some(50), Some(0)))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_predicate_build,
    bench_assemble_and_score,
    bench_filter_and_paginate
);

criterion_main!(benches);
