use gen_adapters::artifacts::{EntitySet, GeneratedArtifact, ParsedGraph};
use gen_adapters::{register_all, DomainOperation};
use gen_core::{CacheConfig, DeterministicSource, IdempotencyVerifier, MemoCache, Pipeline, PipelineStep, TypedPayload,
               VerificationTarget, VerifierConfig};
use serde_json::json;

const GRAPH: &str = r#"
# people
ex:alice ex:name "Alice"@en .
ex:alice ex:knows ex:bob .
ex:bob ex:name "Bob" .
ex:alice ex:knows ex:carol .
"#;

const TEMPLATE: &str = "{% for e in entities %}{{ e.id }}:{% for n in e.properties['ex:name'] %}{{ n }}{% endfor %};{% endfor %}";

fn cache() -> MemoCache {
    let mut cache = MemoCache::new(CacheConfig::default(), DeterministicSource::with_identifier("adapters"));
    register_all(&mut cache);
    cache
}

#[test]
fn parse_then_extract() {
    let cache = cache();
    let parsed = cache.invoke(DomainOperation::ParseTriples.as_str(), &[json!(GRAPH)]).unwrap();
    let graph = ParsedGraph::decode(&parsed.result.value).unwrap();
    assert_eq!(graph.count, 4);

    let extracted = cache.invoke("extract_entities", &[parsed.result.value.clone()]).unwrap();
    let set = EntitySet::decode(&extracted.result.value).unwrap();
    assert_eq!(set.count, 2);
    assert_eq!(set.entities[0].id, "ex:alice");
    assert_eq!(set.entities[0].properties["ex:knows"], vec!["ex:bob", "ex:carol"]);
}

#[test]
fn malformed_input_reports_line() {
    let cache = cache();
    let r = cache.invoke("parse_triples", &[json!("ex:a ex:b ex:c .\nbroken line")]).unwrap();
    assert!(!r.result.success);
    assert!(r.result.error.unwrap().starts_with("line 2:"));
}

#[test]
fn full_generation_pipeline_is_reproducible() {
    let pipeline = Pipeline::build(vec![PipelineStep::op(DomainOperation::ParseTriples),
                                        PipelineStep::op(DomainOperation::ExtractEntities),
                                        PipelineStep::new(DomainOperation::RenderTemplate, vec![json!(TEMPLATE)]),
                                        PipelineStep::new(DomainOperation::GenerateArtifact, vec![json!("people.txt")])]).unwrap();
    let first = pipeline.run(&cache(), json!(GRAPH)).unwrap();
    let second = pipeline.run(&cache(), json!(GRAPH)).unwrap();
    assert!(first.success, "{:?}", first.error);
    let artifact = GeneratedArtifact::decode(first.final_value()).unwrap();
    assert_eq!(artifact.content, "ex:alice:\"Alice\"@en;ex:bob:\"Bob\";");
    assert_eq!(artifact.name, "people.txt");
    assert_eq!(first.outcome_hash(), second.outcome_hash());
}

#[test]
fn generation_is_idempotent_under_verifier() {
    let cache = cache();
    let pipeline = Pipeline::build(vec![PipelineStep::op("parse_triples"),
                                        PipelineStep::op("extract_entities"),
                                        PipelineStep::new("render_template", vec![json!("{{ count }} @ {{ build.timestamp }}")]),
                                        PipelineStep::new("generate_artifact", vec![json!("count.txt")])]).unwrap();
    let verifier = IdempotencyVerifier::new(&cache, VerifierConfig::default());
    let verdict = verifier.verify(&VerificationTarget::Pipeline(pipeline), &json!(GRAPH), 5).unwrap();
    assert!(verdict.is_idempotent);
}

#[test]
fn different_seeds_change_artifact_identity() {
    let mut a = MemoCache::new(CacheConfig::default(), DeterministicSource::with_identifier("one"));
    let mut b = MemoCache::new(CacheConfig::default(), DeterministicSource::with_identifier("two"));
    register_all(&mut a);
    register_all(&mut b);
    let args = [json!("body"), json!("x.txt")];
    let ra = a.invoke("generate_artifact", &args).unwrap();
    let rb = b.invoke("generate_artifact", &args).unwrap();
    assert_eq!(ra.result.value["content_hash"], rb.result.value["content_hash"]);
    assert_ne!(ra.result.value["artifact_id"], rb.result.value["artifact_id"]);
}

#[test]
fn hash_content_ignores_key_order() {
    let cache = cache();
    let a = cache.invoke("hash_content", &[json!({"a": 1, "b": 2})]).unwrap();
    let b = cache.invoke("hash_content", &[json!({"b": 2, "a": 1})]).unwrap();
    assert_eq!(a.result.value, b.result.value);
    // mismo valor canónico => misma clave de cache
    assert!(b.cached);
}
