use urls::{
    arbitrum, aurora, bsc, celo, gnosis, mainnet, optimism, polygon, sepolia, zkevm, zksync,
};

use crate::error::{Error, Result};

/// Directory, relative to the working directory, where signed batches are persisted.
pub const DEFAULT_SIGNATURES_DIR: &str = "temp/sign";

/// Suffix of every persisted signed batch file.
pub const SIGNED_BATCH_SUFFIX: &str = "signed-batch";

/// Default JSON-RPC endpoint exposed by the Frame desktop wallet.
pub const DEFAULT_FRAME_URL: &str = "http://127.0.0.1:1248";

/// Name and version of the delete-request EIP-712 domain.
pub const DELETE_REQUEST_DOMAIN_NAME: &str = "Safe Transaction Service";
pub const DELETE_REQUEST_DOMAIN_VERSION: &str = "1.0";

/// Length of one delete-request TOTP window, in seconds.
pub const TOTP_WINDOW_SECS: u64 = 3600;

pub mod urls {
    pub mod mainnet {
        pub const CHAIN_ID: u64 = 1;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-mainnet.safe.global/api/v1";
    }

    pub mod optimism {
        pub const CHAIN_ID: u64 = 10;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-optimism.safe.global/api/v1";
    }

    pub mod bsc {
        pub const CHAIN_ID: u64 = 56;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-bsc.safe.global/api/v1";
    }

    pub mod gnosis {
        pub const CHAIN_ID: u64 = 100;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-gnosis-chain.safe.global/api/v1";
    }

    pub mod polygon {
        pub const CHAIN_ID: u64 = 137;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-polygon.safe.global/api/v1";
    }

    pub mod zksync {
        pub const CHAIN_ID: u64 = 324;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-zksync.safe.global/api/v1";
    }

    pub mod zkevm {
        pub const CHAIN_ID: u64 = 1101;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-zkevm.safe.global/api/v1";
    }

    pub mod arbitrum {
        pub const CHAIN_ID: u64 = 42161;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-arbitrum.safe.global/api/v1";
    }

    pub mod celo {
        pub const CHAIN_ID: u64 = 42220;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-celo.safe.global/api/v1";
    }

    pub mod sepolia {
        pub const CHAIN_ID: u64 = 11155111;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-sepolia.safe.global/api/v1";
    }

    pub mod aurora {
        pub const CHAIN_ID: u64 = 1313161554;

        pub const TRANSACTION_SERVICE_URL: &str =
            "https://safe-transaction-aurora.safe.global/api/v1";
    }
}

pub fn get_transaction_service_url(chain_id: u64) -> Result<String> {
    let url = match chain_id {
        mainnet::CHAIN_ID => mainnet::TRANSACTION_SERVICE_URL,
        optimism::CHAIN_ID => optimism::TRANSACTION_SERVICE_URL,
        bsc::CHAIN_ID => bsc::TRANSACTION_SERVICE_URL,
        gnosis::CHAIN_ID => gnosis::TRANSACTION_SERVICE_URL,
        polygon::CHAIN_ID => polygon::TRANSACTION_SERVICE_URL,
        zksync::CHAIN_ID => zksync::TRANSACTION_SERVICE_URL,
        zkevm::CHAIN_ID => zkevm::TRANSACTION_SERVICE_URL,
        arbitrum::CHAIN_ID => arbitrum::TRANSACTION_SERVICE_URL,
        celo::CHAIN_ID => celo::TRANSACTION_SERVICE_URL,
        sepolia::CHAIN_ID => sepolia::TRANSACTION_SERVICE_URL,
        aurora::CHAIN_ID => aurora::TRANSACTION_SERVICE_URL,
        _ => {
            return Err(Error::Configuration(format!(
                "Chain ID {chain_id} not supported by the Safe transaction service"
            )))
        }
    };
    Ok(url.to_string())
}
