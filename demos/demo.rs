//! transit-flow 演示脚本
//!
//! 加载样例网络并依次执行各类查询

use transit_flow::algorithm::max_waiting_period;
use transit_flow::cli::Printer;
use transit_flow::{load_network, DatasetOptions, RouteEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("transit-flow 演示");
    println!("==================\n");

    // 1. 加载样例数据
    println!("1. 加载样例网络...");
    let (graph, stats) = load_network("demos/network.txt", DatasetOptions::default())?;
    println!("   节点: {}, 边: {} ({} ms)\n", stats.nodes, stats.edges, stats.duration_ms);

    let mut engine = RouteEngine::new(graph);
    let printer = Printer;
    let (start, end) = (1, 8);

    // 2. 路径查询
    println!("2. 最宽路径 {} -> {}", start, end);
    print!("{}", printer.path(start, end, &engine.get_max_capacity_path(start, end)));

    println!("\n3. 帕累托最优路径（跳数优先）");
    print!(
        "{}",
        printer.path(start, end, &engine.get_pareto_optimal_path(start, end, false))
    );

    // 3. 团体分流
    println!("\n4. 5 人的团体");
    let mut flows = engine.get_path_for_group_of_size(start, end, 5);
    flows.sort();
    print!("{}", printer.flows(&flows, start));

    println!("\n5. 再增加 2 人");
    let mut flows = engine.get_path_with_increment(start, end, 2);
    flows.sort();
    print!("{}", printer.flows(&flows, start));

    println!("\n6. 最大团体");
    let mut flows = engine.get_path_for_group_of_max_size(start, end);
    flows.sort();
    print!("{}", printer.flows(&flows, start));
    print!("{}", printer.bottleneck(&engine.get_bottleneck_edges(start, end)));

    // 4. 调度
    println!("\n7. 汇合与等待");
    let meetup = engine.get_earliest_meetup(start, end);
    print!("{}", printer.meetup(start, end, meetup, &engine.get_critical_path(start, end)));
    let waits = engine.get_waiting_periods(start, end);
    let longest = max_waiting_period(&waits);
    print!("{}", printer.waits(&waits, longest));

    // 5. 指标
    println!("\n8. 指标 (Prometheus)");
    print!("{}", engine.metrics().to_prometheus().content);

    Ok(())
}
