//! 전략 목록 명령어.

use quantlab_strategy::registry;

/// 사용 가능한 전략 목록을 표로 출력합니다.
pub fn print_strategies() {
    println!("\n사용 가능한 전략:\n");
    println!("{:<12} {:<24} {:<20} 설명", "ID", "별칭", "이름");
    println!("{}", "-".repeat(90));

    for meta in registry::all() {
        println!(
            "{:<12} {:<24} {:<20} {}",
            meta.id,
            meta.aliases.join(", "),
            meta.name,
            meta.description
        );
    }
    println!();
}
