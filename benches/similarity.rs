use criterion::{black_box, criterion_group, criterion_main, Criterion};

use meshsim::similarity::{ObjectMeasure, TermMeasure};
use meshsim::thesaurus::Builder;
use meshsim::{Annotation, Ism, Measure, SelectionStrategy, SemanticSimilarity, Thesaurus};

/// A balanced tree below `C01` with `width` children per node and
/// `depth` levels
fn synthetic_thesaurus(width: usize, depth: usize) -> (Thesaurus, Vec<String>) {
    let mut builder = Builder::with_generic_root(&["C"]).unwrap();
    builder.add_descriptor("T0", "Tree", &["C01"]);
    let mut level = vec!["C01".to_string()];
    let mut ids = Vec::new();
    for _ in 0..depth {
        let mut next = Vec::new();
        for parent in &level {
            for i in 0..width {
                let position = format!("{parent}.{i:03}");
                let id = format!("D{:06}", ids.len());
                builder.add_descriptor(&id, &id, &[position.as_str()]);
                ids.push(id);
                next.push(position);
            }
        }
        level = next;
    }
    let thesaurus = builder
        .terms_complete()
        .connect_positions()
        .unwrap()
        .build();
    (thesaurus, ids)
}

fn synthetic_annotation(thesaurus: &Thesaurus, ids: &[String], objects: usize) -> Annotation {
    let mut annotation = Annotation::default();
    for object in 0..objects {
        for k in 0..3 {
            let descriptor = &ids[(object * 7 + k * 13) % ids.len()];
            annotation
                .annotate(thesaurus, &format!("{}", 100_000 + object), descriptor)
                .unwrap();
        }
    }
    annotation
}

fn similarity_benchmark(c: &mut Criterion) {
    let (thesaurus, ids) = synthetic_thesaurus(4, 4);
    let annotation = synthetic_annotation(&thesaurus, &ids, 200);
    let engine = SemanticSimilarity::new(&thesaurus, &annotation).unwrap();

    c.bench_function("per descriptor lin", |b| {
        b.iter(|| engine.per_descriptor(black_box(&TermMeasure::Lin)).unwrap())
    });

    let descriptors = engine.per_descriptor(&TermMeasure::Lin).unwrap();
    c.bench_function("per object lin-alfonso", |b| {
        b.iter(|| {
            engine
                .per_object_termwise(black_box(&descriptors), SelectionStrategy::Alfonso)
                .unwrap()
        })
    });

    c.bench_function("per object simgic", |b| {
        b.iter(|| {
            engine
                .compute(black_box(&Measure::Objectwise(ObjectMeasure::SimGic)))
                .unwrap()
        })
    });

    let hsm = engine
        .compute(&Measure::Objectwise(ObjectMeasure::SimUi))
        .unwrap()
        .into_objects();
    c.bench_function("ism", |b| {
        b.iter(|| {
            Ism::new(&thesaurus, engine.universe())
                .compute(black_box(Some(hsm.matrix())))
                .unwrap()
        })
    });
}

criterion_group!(similarity, similarity_benchmark);
criterion_main!(similarity);
