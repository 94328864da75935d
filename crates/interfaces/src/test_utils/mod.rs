mod blockchain;

pub use blockchain::TestBlockchain;
