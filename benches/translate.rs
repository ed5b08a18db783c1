use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use cilemit::prelude::*;

/// Builds a universe with `type_count` generic types, each carrying a few
/// members, roughly the reference density of a mid-sized module.
fn build_universe(type_count: usize) -> (Arc<SymbolUniverse>, Vec<NamedTypeRc>) {
    let universe = Arc::new(SymbolUniverse::new());
    let mut instances = Vec::with_capacity(type_count);

    for i in 0..type_count {
        let ty = TypeSymbolBuilder::new(&universe)
            .namespace("Bench.Generated")
            .name(format!("Container{i}"))
            .type_parameter("T")
            .build();
        let _ = FieldSymbolBuilder::new(&universe)
            .name("_items")
            .field_type(TypeSig::SzArray(Box::new(TypeSig::TypeParam {
                index: 0,
                method: false,
            })))
            .build(&ty);
        let _ = MethodSymbolBuilder::new(&universe)
            .name("Add")
            .parameter(ParameterSymbol::new(
                "item",
                TypeSig::TypeParam {
                    index: 0,
                    method: false,
                },
            ))
            .returns(TypeSig::Primitive(PrimitiveKind::Void))
            .build(&ty);

        instances.push(ty.instantiate(&universe, vec![TypeSig::Primitive(PrimitiveKind::I4)]));
    }

    (universe, instances)
}

fn bench_translate_cold(c: &mut Criterion) {
    let (_universe, instances) = build_universe(200);
    let ctx = EmitContext::new("Bench.dll");

    c.bench_function("translate_200_instances_cold", |b| {
        b.iter_batched(
            ReferenceTranslator::new,
            |translator| {
                for instance in &instances {
                    let _ = translator.translate_type(instance, &ctx).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_translate_memoized(c: &mut Criterion) {
    let (_universe, instances) = build_universe(200);
    let ctx = EmitContext::new("Bench.dll");
    let translator = ReferenceTranslator::new();
    for instance in &instances {
        let _ = translator.translate_type(instance, &ctx).unwrap();
    }

    c.bench_function("translate_200_instances_memoized", |b| {
        b.iter(|| {
            for instance in &instances {
                let _ = translator.translate_type(instance, &ctx).unwrap();
            }
        });
    });
}

fn bench_structural_matching(c: &mut Criterion) {
    let (old, _) = build_universe(200);
    let (new, new_instances) = build_universe(200);
    let _ = new;
    let matcher = SymbolMatcher::new(&old);

    c.bench_function("match_200_instances", |b| {
        b.iter(|| {
            for instance in &new_instances {
                let _ = matcher.map_type(instance).unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    bench_translate_cold,
    bench_translate_memoized,
    bench_structural_matching
);
criterion_main!(benches);
