#[async_std::main]
async fn main() {
    sea_orm_migration::cli::run_cli(travel_mate_migration::Migrator).await;
}
