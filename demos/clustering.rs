//! Every engine on a small set of labelled items.

use nodeclust::{
    Agglomerative, AgglomerativeParams, AffinityParams, AffinityPropagation, Clustering, Distance,
    Fields, FuzzyCMeans, Kmeans, KmeansParams, Kmedoids, KmedoidsParams, Linkage, Partition,
    Points,
};

struct Host {
    name: &'static str,
    cpu: f64,
    memory: f64,
}

fn host(name: &'static str, cpu: f64, memory: f64) -> Host {
    Host { name, cpu, memory }
}

fn show(title: &str, hosts: &[Host], partition: &Partition) {
    println!("=== {title} ===");
    for (c, members) in partition.iter().enumerate() {
        let names: Vec<&str> = members.iter().map(|&i| hosts[i].name).collect();
        println!("  cluster {c}: {}", names.join(", "));
    }
}

fn main() -> nodeclust::Result<()> {
    // Three groups: idle, busy, and memory-heavy.
    let hosts = vec![
        host("idle-a", 0.0, 0.0),
        host("idle-b", 0.1, 0.2),
        host("idle-c", 0.2, 0.1),
        host("busy-a", 5.0, 5.0),
        host("busy-b", 5.1, 4.9),
        host("busy-c", 4.9, 5.1),
        host("heavy-a", 10.0, 0.0),
        host("heavy-b", 10.1, 0.1),
        host("heavy-c", 9.9, -0.1),
    ];

    let fields = Fields::new()
        .field("cpu", |h: &Host| h.cpu)
        .field("memory", |h: &Host| h.memory);
    let points = Points::extract(&hosts, &fields)?;

    let kmeans = Kmeans::new(KmeansParams {
        seed: Some(42),
        ..KmeansParams::new(3)
    })?;
    show("k-means (k=3)", &hosts, &kmeans.partition(&points)?);

    let kmedoids = Kmedoids::new(KmedoidsParams {
        distance: Distance::Manhattan,
        seed: Some(42),
        ..KmedoidsParams::new(3)
    })?;
    show("k-medoids (k=3, manhattan)", &hosts, &kmedoids.partition(&points)?);

    let fuzzy = FuzzyCMeans::with_k(3)?.fit(&points)?;
    show("fuzzy c-means (k=3)", &hosts, &fuzzy.partition);
    for (host, row) in hosts.iter().zip(fuzzy.membership.rows()) {
        let degrees: Vec<String> = row.iter().map(|u| format!("{u:.2}")).collect();
        println!("  {:8} [{}]", host.name, degrees.join(", "));
    }

    let ap = AffinityPropagation::new(AffinityParams::default())?;
    show("affinity propagation", &hosts, &ap.partition(&points)?);

    let agglomerative = Agglomerative::new(AgglomerativeParams {
        linkage: Linkage::Average,
        threshold: 2.0,
        ..AgglomerativeParams::default()
    })?;
    show("agglomerative (average, threshold=2)", &hosts, &agglomerative.partition(&points)?);

    Ok(())
}
