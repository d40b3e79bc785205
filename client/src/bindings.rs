//! ABI bindings for the deployed exchange and token contracts.
//!
//! The exchange is itself the ERC20 LP token, so `totalSupply`/`balanceOf`
//! on it refer to LP shares.

pub mod exchange {
    use ethers::contract::abigen;

    abigen!(
        ExchangeContract,
        r#"[
            function totalSupply() external view returns (uint256)
            function balanceOf(address account) external view returns (uint256)
            function getReserve() public view returns (uint256)
            function addLiquidity(uint256 _amount) public payable returns (uint256)
            function removeLiquidity(uint256 _amount) public returns (uint256, uint256)
            function getAmountOfTokens(uint256 inputAmount, uint256 inputReserve, uint256 outputReserve) public pure returns (uint256)
            function ethToItuDevToken(uint256 _minTokens) public payable
            function ituDevTokenToEth(uint256 _tokensSold, uint256 _minEth) public
        ]"#,
    );
}

pub mod token {
    use ethers::contract::abigen;

    abigen!(
        TokenContract,
        r#"[
            function balanceOf(address account) external view returns (uint256)
            function approve(address spender, uint256 amount) external returns (bool)
        ]"#,
    );
}

pub use exchange::ExchangeContract;
pub use token::TokenContract;
