//! Full pipeline on a small procurement-flavored dataset: clean, normalize,
//! cluster, refine, then score a price outlier against its sibling
//! categories.

use fraudsift::{
    entity::clean_invalid, Agglomerative, CategoryMap, Entity, FraudScorer, HybridEngine,
    Normalizer, NormalizerConfig, SimpleEngine,
};

fn main() {
    let config = NormalizerConfig::default()
        .synonym("laptop", &["notebook", "portable computer"])
        .noise_phrase("brand new");
    let normalizer = Normalizer::new(&config).expect("static config compiles");

    let raw_items = vec![
        Entity::new("Notebook Dell XPS 13, 16GB RAM", 2.0, 9200.0, 401),
        Entity::new("Laptop Dell XPS 15, 32GB RAM", 1.0, 7100.0, 401),
        Entity::new("Brand new Laptop HP Pavilion, silver", 3.0, 9900.0, 401),
        Entity::new("Telefon Samsung Galaxy S24, 128GB, Onyx Black", 24.0, 58_487.0, 402),
        Entity::new("Telefon Samsung Galaxy S24, 256GB", 10.0, 29_990.0, 402),
        Entity::new("Scaun birou ergonomic", 12.0, 8_400.0, 403),
        Entity::new("", 1.0, 100.0, 403), // dropped by cleaning
    ];
    let items = clean_invalid(&raw_items);

    // --- Hybrid clustering ---
    let simple = SimpleEngine::new(normalizer);
    let hybrid = HybridEngine::new(simple).with_seed(42);
    let grouping = hybrid
        .cluster(&items, &Agglomerative::new())
        .expect("clustering succeeds on non-empty input");

    println!("=== Clusters ===");
    for (id, cluster) in grouping.clusters().iter().enumerate() {
        println!("cluster {id}:");
        for item in cluster {
            println!("  {} ({:.2}/unit)", item.name, item.unit_price());
        }
    }

    // --- Fraud scoring against sibling categories ---
    let categories = CategoryMap::from_groups(vec![vec![401], vec![402, 404], vec![403]]);
    let market = vec![
        Entity::new("telefon a", 1.0, 2400.0, 402),
        Entity::new("telefon b", 1.0, 2450.0, 404),
        Entity::new("telefon c", 1.0, 2520.0, 402),
        Entity::new("telefon d", 1.0, 2480.0, 404),
        Entity::new("telefon e", 1.0, 9900.0, 402),
    ];
    let target = Entity::new("Telefon Samsung Galaxy S24", 4.0, 9_748.0, 402);

    let siblings = categories.siblings(target.category_id);
    let comparators: Vec<Entity> = market
        .iter()
        .filter(|item| siblings.contains(&item.category_id))
        .cloned()
        .collect();

    let scorer = FraudScorer::new();
    let score = scorer
        .score(&target, &comparators)
        .expect("non-empty comparator set");
    println!("\n=== Fraud score ===");
    println!("{}: {:.1}%", target.name, score);
}
