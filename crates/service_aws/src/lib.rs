mod eventbridge;
mod rds;
mod sns;

pub use eventbridge::EventBridgeScheduler;
pub use rds::RdsInstance;
pub use sns::SnsNotifier;
